//! Storage abstractions for city-temps services.
//!
//! Provides read-only interfaces for:
//! - City records and their country labels
//! - Per-city attributes (coordinates under their legacy key names)
//!
//! with a PostgreSQL catalog and a YAML-seeded in-memory catalog behind them.

pub mod catalog;
pub mod memory;
pub mod seed;
pub mod store;

pub use catalog::Catalog;
pub use memory::MemoryCatalog;
pub use seed::{CitySeed, SeedCity};
pub use store::{CityStore, MetadataStore};
