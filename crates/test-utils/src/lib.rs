//! Shared test utilities for the city-temps workspace.
//!
//! This crate provides common testing infrastructure including:
//! - City fixtures and upstream payloads
//! - Synthetic city generators
//! - Scripted fetcher and failing store doubles
//! - Config/seed path helpers
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{fixtures, ScriptedFetcher};
//! ```

pub mod doubles;
pub mod fixtures;
pub mod generators;
pub mod paths;

// Re-export commonly used items at the crate root
pub use doubles::*;
pub use fixtures::*;
pub use generators::*;
pub use paths::*;
