//! City search and listing handlers.

use axum::{
    extract::{Extension, Form, Query},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;

use crate::handlers::cities_error_response;
use crate::html;
use crate::rows::{listing_rows, search_rows};
use crate::state::AppState;

/// Free-text search term, from the query string or a form body.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub search: String,
}

/// GET /api/cities/search?search=...
#[instrument(skip(state))]
pub async fn search_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Response {
    search(&state, &params.search).await
}

/// POST /api/cities/search (form field `search`)
#[instrument(skip(state))]
pub async fn search_form_handler(
    Extension(state): Extension<Arc<AppState>>,
    Form(params): Form<SearchParams>,
) -> Response {
    search(&state, &params.search).await
}

async fn search(state: &AppState, query: &str) -> Response {
    match search_rows(state, query).await {
        Ok(rows) => Json(rows).into_response(),
        Err(e) => cities_error_response(&e),
    }
}

/// GET /api/cities
#[instrument(skip(state))]
pub async fn listing_handler(Extension(state): Extension<Arc<AppState>>) -> Response {
    match listing_rows(&state).await {
        Ok(rows) => Json(rows).into_response(),
        Err(e) => cities_error_response(&e),
    }
}

/// GET /cities - HTML table, optionally filtered by `search`
#[instrument(skip(state))]
pub async fn table_page_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Response {
    let term = params.search.trim();
    let rows = if term.is_empty() {
        listing_rows(&state).await
    } else {
        search_rows(&state, term).await
    };

    match rows {
        Ok(rows) => Html(html::render_page(&rows, term)).into_response(),
        Err(e) => cities_error_response(&e),
    }
}
