//! Application state for the cities API.

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tracing::info;

use storage::{Catalog, CityStore, MemoryCatalog, MetadataStore};
use weather::{
    CachePolicy, CoordinateResolver, MemoryWeatherCache, OpenWeatherClient, RedisWeatherCache,
    TemperatureResolver, WeatherCache, WeatherFetcher,
};

use crate::config::{CacheBackend, ServiceConfig, StorageBackend};

/// Cache policy of each call path.
#[derive(Debug, Clone)]
pub struct Policies {
    pub search: CachePolicy,
    pub listing: CachePolicy,
    pub widget: CachePolicy,
}

impl Policies {
    pub fn from_config(config: &ServiceConfig) -> Self {
        Self {
            search: config.search.cache_policy(),
            listing: config.listing.cache_policy(),
            widget: config.widget.cache_policy(),
        }
    }
}

/// Shared application state.
pub struct AppState {
    /// City catalog.
    pub store: Arc<dyn CityStore>,

    /// Cache-or-fetch temperature lookup.
    pub resolver: TemperatureResolver,

    pub policies: Policies,

    /// Renders `/metrics`; absent when no recorder is installed.
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    /// Wire state from already-built collaborators.
    pub fn new(
        store: Arc<dyn CityStore>,
        metadata: Arc<dyn MetadataStore>,
        cache: Arc<dyn WeatherCache>,
        fetcher: Arc<dyn WeatherFetcher>,
        config: &ServiceConfig,
    ) -> Self {
        let coordinates = CoordinateResolver::new(metadata, config.coordinates.clone());
        let resolver = TemperatureResolver::new(cache, fetcher, coordinates)
            .with_concurrency(config.weather.concurrency);

        Self {
            store,
            resolver,
            policies: Policies::from_config(config),
            prometheus: None,
        }
    }

    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }

    /// Build state from configuration, connecting to the configured backends.
    pub async fn from_config(config: &ServiceConfig) -> Result<Self> {
        let (store, metadata): (Arc<dyn CityStore>, Arc<dyn MetadataStore>) =
            match config.storage.backend {
                StorageBackend::Postgres => {
                    let catalog = Arc::new(
                        Catalog::connect(&config.storage.database_url)
                            .await
                            .context("Failed to connect to city catalog")?,
                    );
                    if config.storage.migrate {
                        catalog.migrate().await.context("Failed to migrate schema")?;
                    }
                    if config.storage.import_seed {
                        let seed = storage::CitySeed::load(&config.storage.seed_file)?;
                        let imported = catalog.import_seed(&seed).await?;
                        info!(imported, "Imported seed cities into catalog");
                    }
                    let store: Arc<dyn CityStore> = catalog.clone();
                    let metadata: Arc<dyn MetadataStore> = catalog;
                    (store, metadata)
                }
                StorageBackend::Seed => {
                    let catalog = Arc::new(
                        MemoryCatalog::load(&config.storage.seed_file).with_context(|| {
                            format!("Failed to load seed {:?}", config.storage.seed_file)
                        })?,
                    );
                    let store: Arc<dyn CityStore> = catalog.clone();
                    let metadata: Arc<dyn MetadataStore> = catalog;
                    (store, metadata)
                }
            };

        let cache: Arc<dyn WeatherCache> = match config.cache.backend {
            CacheBackend::Memory => Arc::new(MemoryWeatherCache::new(config.cache.max_entries)),
            CacheBackend::Redis => Arc::new(
                RedisWeatherCache::connect(&config.cache.redis_url)
                    .await
                    .context("Failed to connect to Redis")?,
            ),
        };

        let fetcher = Arc::new(OpenWeatherClient::new(config.weather.fetcher_config())?);

        info!(
            storage = ?config.storage.backend,
            cache = cache.backend(),
            concurrency = config.weather.concurrency,
            "Application state initialized"
        );

        Ok(Self::new(store, metadata, cache, fetcher, config))
    }
}
