//! Per-city temperature cache.
//!
//! ## Cache Key Structure
//! Keys are composed of: prefix:city_id (e.g. `city_temp:42`). One entry per
//! city, never per query.
//!
//! ## Expiry
//! - Each entry carries the TTL it was inserted with
//! - Expiry is checked lazily on read; an expired entry is removed and
//!   reported as a miss
//! - Entries are never refreshed in place, a `put` replaces them
//!
//! Only successful readings are ever stored. Failures are not cached so the
//! next lookup goes upstream again.

use async_trait::async_trait;
use lru::LruCache;
use serde::Serialize;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

use cities_common::CityId;

/// Default key prefix shared by every call path.
pub const DEFAULT_KEY_PREFIX: &str = "city_temp";

/// Cache key for a city's temperature.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct CacheKey {
    /// Key namespace (e.g., "city_temp")
    pub prefix: String,
    /// City the reading belongs to
    pub city: CityId,
}

impl CacheKey {
    pub fn new(prefix: impl Into<String>, city: CityId) -> Self {
        Self {
            prefix: prefix.into(),
            city,
        }
    }

    /// Convert to the string form used by every backend.
    pub fn to_string_key(&self) -> String {
        format!("{}:{}", self.prefix, self.city)
    }
}

/// Storage for rounded temperature readings with a per-entry TTL.
#[async_trait]
pub trait WeatherCache: Send + Sync {
    /// Cached reading, or `None` on miss or expiry.
    async fn get(&self, key: &CacheKey) -> Option<f64>;

    /// Store a reading, replacing any existing entry for the key.
    async fn put(&self, key: &CacheKey, celsius: f64, ttl: Duration);

    /// Remove every entry, returning how many were dropped.
    async fn clear(&self) -> u64;

    /// Backend name for diagnostics.
    fn backend(&self) -> &'static str;

    /// Statistics, for backends that track them.
    fn stats(&self) -> Option<CacheStatsSnapshot> {
        None
    }
}

/// Cached reading.
struct CachedTemperature {
    celsius: f64,
    /// When this entry was inserted.
    inserted_at: Instant,
    /// Time-to-live for this entry.
    ttl: Duration,
}

impl CachedTemperature {
    fn is_expired(&self) -> bool {
        self.inserted_at.elapsed() >= self.ttl
    }
}

/// Statistics for the memory cache.
#[derive(Default)]
pub struct CacheStats {
    /// Total cache hits.
    pub hits: AtomicU64,
    /// Total cache misses (including expired reads).
    pub misses: AtomicU64,
    /// Total entries evicted to make room.
    pub evictions: AtomicU64,
    /// Total entries expired via TTL.
    pub expired: AtomicU64,
    /// Current number of entries.
    pub entry_count: AtomicU64,
}

impl CacheStats {
    /// Calculate cache hit rate as a percentage (0-100).
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            (hits as f64 / total as f64) * 100.0
        }
    }

    pub fn snapshot(&self) -> CacheStatsSnapshot {
        CacheStatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            expired: self.expired.load(Ordering::Relaxed),
            entries: self.entry_count.load(Ordering::Relaxed),
            hit_rate: self.hit_rate(),
        }
    }
}

/// Point-in-time copy of [`CacheStats`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expired: u64,
    pub entries: u64,
    pub hit_rate: f64,
}

/// In-process LRU cache bounded by entry count.
pub struct MemoryWeatherCache {
    cache: Arc<RwLock<LruCache<String, CachedTemperature>>>,
    stats: Arc<CacheStats>,
}

impl MemoryWeatherCache {
    /// Create a new memory cache holding at most `max_entries` cities.
    pub fn new(max_entries: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);

        tracing::info!(
            max_entries = capacity.get(),
            "MemoryWeatherCache initialized"
        );

        Self {
            cache: Arc::new(RwLock::new(LruCache::new(capacity))),
            stats: Arc::new(CacheStats::default()),
        }
    }

    /// Live statistics.
    pub fn cache_stats(&self) -> &CacheStats {
        &self.stats
    }

    pub async fn len(&self) -> usize {
        self.cache.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.cache.read().await.is_empty()
    }
}

#[async_trait]
impl WeatherCache for MemoryWeatherCache {
    async fn get(&self, key: &CacheKey) -> Option<f64> {
        let string_key = key.to_string_key();
        let mut cache = self.cache.write().await;

        let lookup = cache
            .get(&string_key)
            .map(|entry| (entry.is_expired(), entry.celsius));

        match lookup {
            Some((true, _)) => {
                // Remove expired entry
                cache.pop(&string_key);
                self.stats.expired.fetch_add(1, Ordering::Relaxed);
                self.stats.entry_count.fetch_sub(1, Ordering::Relaxed);
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            Some((false, celsius)) => {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                Some(celsius)
            }
            None => {
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    async fn put(&self, key: &CacheKey, celsius: f64, ttl: Duration) {
        let string_key = key.to_string_key();
        let entry = CachedTemperature {
            celsius,
            inserted_at: Instant::now(),
            ttl,
        };

        let mut cache = self.cache.write().await;

        // push returns the replaced entry for the same key, or the evicted
        // LRU entry when the cache was full.
        match cache.push(string_key.clone(), entry) {
            Some((old_key, _)) if old_key == string_key => {}
            Some(_) => {
                self.stats.evictions.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(key = %string_key, "MemoryWeatherCache evicted LRU entry");
            }
            None => {
                self.stats.entry_count.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    async fn clear(&self) -> u64 {
        let mut cache = self.cache.write().await;
        let count = cache.len() as u64;
        cache.clear();
        self.stats.entry_count.store(0, Ordering::Relaxed);
        tracing::info!("MemoryWeatherCache cleared {} entries", count);
        count
    }

    fn backend(&self) -> &'static str {
        "memory"
    }

    fn stats(&self) -> Option<CacheStatsSnapshot> {
        Some(self.stats.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIFTEEN_MINUTES: Duration = Duration::from_secs(15 * 60);

    #[tokio::test]
    async fn test_cache_put_get() {
        let cache = MemoryWeatherCache::new(100);
        let key = CacheKey::new(DEFAULT_KEY_PREFIX, CityId(1));

        cache.put(&key, 18.5, FIFTEEN_MINUTES).await;

        assert_eq!(cache.get(&key).await, Some(18.5));
    }

    #[tokio::test]
    async fn test_cache_miss() {
        let cache = MemoryWeatherCache::new(100);
        let key = CacheKey::new(DEFAULT_KEY_PREFIX, CityId(404));

        assert!(cache.get(&key).await.is_none());
        assert_eq!(cache.cache_stats().misses.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_cache_key_format() {
        let key = CacheKey::new("city_temp", CityId(42));
        assert_eq!(key.to_string_key(), "city_temp:42");
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_ttl() {
        let cache = MemoryWeatherCache::new(100);
        let key = CacheKey::new(DEFAULT_KEY_PREFIX, CityId(1));

        cache.put(&key, 10.0, FIFTEEN_MINUTES).await;

        tokio::time::advance(Duration::from_secs(14 * 60)).await;
        assert_eq!(cache.get(&key).await, Some(10.0));

        tokio::time::advance(Duration::from_secs(60)).await;
        assert_eq!(cache.get(&key).await, None);
        assert_eq!(cache.cache_stats().expired.load(Ordering::Relaxed), 1);
        assert!(cache.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_put_overwrites_and_restarts_ttl() {
        let cache = MemoryWeatherCache::new(100);
        let key = CacheKey::new(DEFAULT_KEY_PREFIX, CityId(1));

        cache.put(&key, 10.0, Duration::from_secs(60)).await;
        tokio::time::advance(Duration::from_secs(50)).await;
        cache.put(&key, 11.0, Duration::from_secs(60)).await;
        tokio::time::advance(Duration::from_secs(50)).await;

        assert_eq!(cache.get(&key).await, Some(11.0));
        assert_eq!(cache.cache_stats().entry_count.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_lru_eviction() {
        let cache = MemoryWeatherCache::new(2);

        for id in 1..=3 {
            cache
                .put(&CacheKey::new("t", CityId(id)), id as f64, FIFTEEN_MINUTES)
                .await;
        }

        assert_eq!(cache.len().await, 2);
        assert!(cache.get(&CacheKey::new("t", CityId(1))).await.is_none());
        assert_eq!(cache.cache_stats().evictions.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_prefixes_are_separate_entries() {
        let cache = MemoryWeatherCache::new(100);

        cache
            .put(&CacheKey::new("search", CityId(1)), 1.0, FIFTEEN_MINUTES)
            .await;

        assert!(cache
            .get(&CacheKey::new("listing", CityId(1)))
            .await
            .is_none());
        assert_eq!(
            cache.get(&CacheKey::new("search", CityId(1))).await,
            Some(1.0)
        );
    }

    #[tokio::test]
    async fn test_cache_stats() {
        let cache = MemoryWeatherCache::new(100);
        let key1 = CacheKey::new("t", CityId(1));
        let key2 = CacheKey::new("t", CityId(2));

        // Miss
        cache.get(&key1).await;

        // Put then hit
        cache.put(&key1, 3.0, FIFTEEN_MINUTES).await;
        cache.get(&key1).await;

        // Another miss
        cache.get(&key2).await;

        let snapshot = cache.stats().unwrap();
        assert_eq!(snapshot.hits, 1);
        assert_eq!(snapshot.misses, 2);
        assert_eq!(snapshot.entries, 1);
        assert!((snapshot.hit_rate - 33.33).abs() < 1.0);
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = MemoryWeatherCache::new(100);
        cache
            .put(&CacheKey::new("t", CityId(1)), 1.0, FIFTEEN_MINUTES)
            .await;
        cache
            .put(&CacheKey::new("t", CityId(2)), 2.0, FIFTEEN_MINUTES)
            .await;

        assert_eq!(cache.clear().await, 2);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_concurrent_puts_same_key() {
        let cache = Arc::new(MemoryWeatherCache::new(100));
        let key = CacheKey::new("t", CityId(7));

        let mut handles = Vec::new();
        for i in 0..16 {
            let cache = cache.clone();
            let key = key.clone();
            handles.push(tokio::spawn(async move {
                cache.put(&key, i as f64, FIFTEEN_MINUTES).await;
                cache.get(&key).await
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap().is_some());
        }

        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.cache_stats().entry_count.load(Ordering::Relaxed), 1);
    }
}
