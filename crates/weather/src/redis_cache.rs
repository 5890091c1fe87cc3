//! Redis-backed temperature cache for multi-process deployments.
//!
//! Expiry is delegated to Redis (`SET ... EX`). Redis errors never fail a
//! lookup: a failed read is a miss and a failed write is dropped.

use async_trait::async_trait;
use redis::{aio::MultiplexedConnection, AsyncCommands, Client};
use std::time::Duration;
use tracing::warn;

use cities_common::{CitiesError, CitiesResult};

use crate::cache::{CacheKey, WeatherCache};

/// Redis temperature cache client.
pub struct RedisWeatherCache {
    conn: MultiplexedConnection,
}

impl RedisWeatherCache {
    /// Connect to Redis.
    pub async fn connect(redis_url: &str) -> CitiesResult<Self> {
        let client = Client::open(redis_url)
            .map_err(|e| CitiesError::CacheError(format!("Redis connection failed: {}", e)))?;

        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| CitiesError::CacheError(format!("Redis connection failed: {}", e)))?;

        Ok(Self { conn })
    }
}

/// Redis rejects `EX 0`, so sub-second TTLs are rounded up to one second.
fn ttl_seconds(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

#[async_trait]
impl WeatherCache for RedisWeatherCache {
    async fn get(&self, key: &CacheKey) -> Option<f64> {
        let key_str = key.to_string_key();
        let mut conn = self.conn.clone();

        match conn.get::<_, Option<f64>>(&key_str).await {
            Ok(value) => value,
            Err(e) => {
                warn!(key = %key_str, error = %e, "Redis cache get failed");
                None
            }
        }
    }

    async fn put(&self, key: &CacheKey, celsius: f64, ttl: Duration) {
        let key_str = key.to_string_key();
        let mut conn = self.conn.clone();

        let result: redis::RedisResult<()> = conn.set_ex(&key_str, celsius, ttl_seconds(ttl)).await;
        if let Err(e) = result {
            warn!(key = %key_str, error = %e, "Redis cache set failed");
        }
    }

    async fn clear(&self) -> u64 {
        // Entries in a shared Redis are left to expire on their own.
        0
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
