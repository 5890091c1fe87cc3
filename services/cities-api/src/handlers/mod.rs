//! HTTP request handlers for the cities API.

pub mod cache;
pub mod cities;
pub mod health;
pub mod widget;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use cities_common::CitiesError;

/// JSON error body with the given status.
pub(crate) fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// Map a request-level failure to its HTTP response.
pub(crate) fn cities_error_response(err: &CitiesError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        tracing::error!(error = %err, "Request failed");
    } else {
        tracing::debug!(error = %err, "Request rejected");
    }
    error_response(status, &err.to_string())
}
