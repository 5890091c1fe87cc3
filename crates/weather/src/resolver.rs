//! Temperature resolution for city records.
//!
//! For one city: cache hit returns immediately; on a miss the coordinate
//! resolver picks a lookup target, the fetcher goes upstream once, and a
//! successful reading is cached with the call path's TTL. Failures come back
//! as [`Temperature::Unavailable`] and are neither cached nor retried.

use futures::stream::{self, StreamExt};
use metrics::counter;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use cities_common::{CityRecord, Temperature};

use crate::cache::{CacheKey, WeatherCache, DEFAULT_KEY_PREFIX};
use crate::coordinates::CoordinateResolver;
use crate::fetcher::WeatherFetcher;

/// Freshness policy of one call path.
#[derive(Debug, Clone, PartialEq)]
pub struct CachePolicy {
    /// Lifetime of entries written by this call path.
    pub ttl: Duration,
    /// Key namespace. Call paths sharing a prefix share entries.
    pub key_prefix: String,
}

impl CachePolicy {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    pub fn key_for(&self, city: &CityRecord) -> CacheKey {
        CacheKey::new(self.key_prefix.clone(), city.id)
    }
}

/// Cache-or-fetch orchestration.
#[derive(Clone)]
pub struct TemperatureResolver {
    cache: Arc<dyn WeatherCache>,
    fetcher: Arc<dyn WeatherFetcher>,
    coordinates: CoordinateResolver,
    concurrency: usize,
}

impl TemperatureResolver {
    pub fn new(
        cache: Arc<dyn WeatherCache>,
        fetcher: Arc<dyn WeatherFetcher>,
        coordinates: CoordinateResolver,
    ) -> Self {
        Self {
            cache,
            fetcher,
            coordinates,
            concurrency: 8,
        }
    }

    /// Maximum number of cities resolved at once by [`Self::resolve_many`].
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn cache(&self) -> &Arc<dyn WeatherCache> {
        &self.cache
    }

    /// Resolve the temperature for a single city.
    pub async fn resolve(&self, city: &CityRecord, policy: &CachePolicy) -> Temperature {
        let key = policy.key_for(city);

        if let Some(celsius) = self.cache.get(&key).await {
            counter!("weather_cache_hits_total").increment(1);
            debug!(city_id = %city.id, celsius, "Temperature cache hit");
            return Temperature::Celsius(celsius);
        }
        counter!("weather_cache_misses_total").increment(1);

        let Some(target) = self.coordinates.resolve(city).await else {
            return Temperature::Unavailable;
        };

        match self.fetcher.fetch(&target).await {
            Ok(celsius) => {
                self.cache.put(&key, celsius, policy.ttl).await;
                Temperature::Celsius(celsius)
            }
            Err(failure) => {
                debug!(city_id = %city.id, error = %failure, "Temperature unavailable");
                Temperature::Unavailable
            }
        }
    }

    /// Resolve many cities concurrently. Output order matches input order.
    pub async fn resolve_many(
        &self,
        cities: &[CityRecord],
        policy: &CachePolicy,
    ) -> Vec<Temperature> {
        let futures: Vec<_> = cities
            .iter()
            .map(|city| self.resolve(city, policy))
            .collect();
        stream::iter(futures)
            .buffered(self.concurrency)
            .collect()
            .await
    }
}
