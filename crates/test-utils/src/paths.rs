//! Path utilities for locating shipped config and seed files in tests.

use std::path::PathBuf;

/// Returns the workspace root directory.
///
/// This is determined by walking up from the current crate's manifest directory
/// until we find the workspace Cargo.toml.
pub fn workspace_root() -> PathBuf {
    // Start from the test-utils crate manifest dir
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent() // crates/
        .and_then(|p| p.parent()) // workspace root
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(manifest_dir))
}

/// Returns the workspace `config/` directory.
pub fn config_dir() -> PathBuf {
    workspace_root().join("config")
}

/// Path of the sample city seed shipped with the service.
pub fn sample_seed_path() -> PathBuf {
    config_dir().join("cities.yaml")
}
