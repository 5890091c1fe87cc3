//! Cities API Service Library
//!
//! HTTP surface over the city catalog: free-text search, full listing (JSON
//! and an HTML table) and single-city temperatures, each row carrying the
//! current temperature from the shared weather cache.

pub mod config;
pub mod handlers;
pub mod html;
pub mod rows;
pub mod state;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// Build the service router with its middleware stack.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Cities
        .route(
            "/api/cities/search",
            get(handlers::cities::search_handler).post(handlers::cities::search_form_handler),
        )
        .route("/api/cities", get(handlers::cities::listing_handler))
        .route(
            "/api/cities/:id/weather",
            get(handlers::widget::city_weather_handler),
        )
        .route("/cities", get(handlers::cities::table_page_handler))
        // Cache
        .route(
            "/api/cache/stats",
            get(handlers::cache::cache_stats_handler),
        )
        .route(
            "/api/cache/clear",
            post(handlers::cache::cache_clear_handler),
        )
        // Health and metrics
        .route("/health", get(handlers::health::health_handler))
        .route("/ready", get(handlers::health::ready_handler))
        .route("/metrics", get(handlers::health::metrics_handler))
        // Middleware
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
