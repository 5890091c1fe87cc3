//! Common types and utilities for city-temps services.

pub mod error;
pub mod types;

pub use error::{CitiesError, CitiesResult};
pub use types::*;
