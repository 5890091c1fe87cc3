//! Read-only interfaces onto the city catalog.

use async_trait::async_trait;

use cities_common::{CitiesResult, CityId, CityRecord};

/// Query access to published city records.
#[async_trait]
pub trait CityStore: Send + Sync {
    /// Published cities whose name contains `query` (case-insensitive),
    /// in storage order. An empty query matches every published city.
    async fn search_published(&self, query: &str) -> CitiesResult<Vec<CityRecord>>;

    /// All published cities with their country labels, sorted by name
    /// ignoring case. Equal names keep id order.
    async fn list_published(&self) -> CitiesResult<Vec<CityRecord>>;

    /// A single published city.
    async fn get_published(&self, id: CityId) -> CitiesResult<Option<CityRecord>>;

    /// Cheap connectivity check for readiness probes.
    async fn ping(&self) -> CitiesResult<()>;
}

/// Attribute lookups for a city (coordinates and other custom fields).
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Stored value for `key`, or `None` when absent or blank.
    async fn get_meta(&self, id: CityId, key: &str) -> CitiesResult<Option<String>>;
}

/// Treat blank stored values the same as missing ones.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
