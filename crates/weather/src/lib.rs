//! Temperature lookup and caching for city records.
//!
//! Sits between the request path and an unreliable upstream weather API:
//! - [`coordinates`] resolves a city to coordinates or a name fallback
//! - [`cache`] / [`redis_cache`] hold rounded readings with a TTL
//! - [`fetcher`] performs the upstream call
//! - [`resolver`] orchestrates the above per city and per batch

pub mod cache;
pub mod coordinates;
pub mod fetcher;
pub mod redis_cache;
pub mod resolver;

pub use cache::{CacheKey, CacheStats, CacheStatsSnapshot, MemoryWeatherCache, WeatherCache};
pub use coordinates::{CoordinateKeys, CoordinateResolver, LookupTarget};
pub use fetcher::{FetchFailure, FetcherConfig, OpenWeatherClient, WeatherFetcher};
pub use redis_cache::RedisWeatherCache;
pub use resolver::{CachePolicy, TemperatureResolver};
