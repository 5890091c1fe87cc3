//! In-memory city catalog backed by a seed document.
//!
//! Used for local runs without PostgreSQL and throughout the test suites.
//! Storage order is ascending city id, matching the PostgreSQL catalog.

use async_trait::async_trait;
use std::path::Path;

use cities_common::{CitiesResult, CityId, CityRecord};

use crate::seed::{CitySeed, SeedCity};
use crate::store::{non_blank, CityStore, MetadataStore};

/// Immutable in-memory catalog.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    cities: Vec<SeedCity>,
}

impl MemoryCatalog {
    pub fn new(mut cities: Vec<SeedCity>) -> Self {
        cities.sort_by_key(|c| c.id);
        Self { cities }
    }

    pub fn from_seed(seed: CitySeed) -> Self {
        Self::new(seed.cities)
    }

    /// Load a catalog from a YAML seed file.
    pub fn load(path: &Path) -> CitiesResult<Self> {
        let seed = CitySeed::load(path)?;
        tracing::info!(
            cities = seed.cities.len(),
            path = %path.display(),
            "Loaded city seed"
        );
        Ok(Self::from_seed(seed))
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    fn published(&self) -> impl Iterator<Item = &SeedCity> {
        self.cities.iter().filter(|c| c.status.is_published())
    }
}

#[async_trait]
impl CityStore for MemoryCatalog {
    async fn search_published(&self, query: &str) -> CitiesResult<Vec<CityRecord>> {
        let needle = query.to_lowercase();

        Ok(self
            .published()
            .filter(|c| c.name.to_lowercase().contains(&needle))
            .map(SeedCity::record)
            .collect())
    }

    async fn list_published(&self) -> CitiesResult<Vec<CityRecord>> {
        let mut records: Vec<CityRecord> = self.published().map(SeedCity::record).collect();
        // Stable sort keeps id order among equal names.
        records.sort_by_key(|c| c.name.to_lowercase());
        Ok(records)
    }

    async fn get_published(&self, id: CityId) -> CitiesResult<Option<CityRecord>> {
        Ok(self
            .published()
            .find(|c| c.id == id.0)
            .map(SeedCity::record))
    }

    async fn ping(&self) -> CitiesResult<()> {
        Ok(())
    }
}

#[async_trait]
impl MetadataStore for MemoryCatalog {
    async fn get_meta(&self, id: CityId, key: &str) -> CitiesResult<Option<String>> {
        let value = self
            .cities
            .iter()
            .find(|c| c.id == id.0)
            .and_then(|c| c.meta.get(key).cloned());

        Ok(non_blank(value))
    }
}
