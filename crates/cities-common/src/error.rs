//! Error types for city-temps services.

use thiserror::Error;

/// Result type alias using CitiesError.
pub type CitiesResult<T> = Result<T, CitiesError>;

/// Primary error type for city lookups.
///
/// Per-city weather failures are never reported through this type; they are
/// folded into [`crate::Temperature::Unavailable`]. Only failures that should
/// abort a whole request end up here.
#[derive(Debug, Error)]
pub enum CitiesError {
    // === Request Errors ===
    #[error("City not found: {0}")]
    CityNotFound(String),

    // === Storage Errors ===
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Seed data error: {0}")]
    SeedError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    // === Infrastructure Errors ===
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl CitiesError {
    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            CitiesError::CityNotFound(_) => 404,
            _ => 500,
        }
    }
}
