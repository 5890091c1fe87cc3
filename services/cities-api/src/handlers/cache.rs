//! Temperature cache inspection handlers.

use axum::{extract::Extension, Json};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};

use weather::CacheStatsSnapshot;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CacheStatsResponse {
    pub backend: &'static str,
    #[serde(flatten)]
    pub stats: Option<CacheStatsSnapshot>,
}

#[derive(Debug, Serialize)]
pub struct CacheClearResponse {
    pub backend: &'static str,
    pub cleared: u64,
    pub cleared_at: String,
}

/// GET /api/cache/stats
pub async fn cache_stats_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Json<CacheStatsResponse> {
    let cache = state.resolver.cache();
    Json(CacheStatsResponse {
        backend: cache.backend(),
        stats: cache.stats(),
    })
}

/// POST /api/cache/clear
#[instrument(skip(state))]
pub async fn cache_clear_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Json<CacheClearResponse> {
    let cache = state.resolver.cache();
    let cleared = cache.clear().await;
    info!(backend = cache.backend(), cleared, "Temperature cache cleared");

    Json(CacheClearResponse {
        backend: cache.backend(),
        cleared,
        cleared_at: chrono::Utc::now().to_rfc3339(),
    })
}
