//! Single-city temperature handler.

use axum::{
    extract::{Extension, Path},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;

use cities_common::{CitiesError, CityId, Temperature};

use crate::handlers::cities_error_response;
use crate::rows::city_weather;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CityWeatherResponse {
    pub city: String,
    pub temperature: Temperature,
}

/// GET /api/cities/:id/weather
#[instrument(skip(state))]
pub async fn city_weather_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Response {
    match city_weather(&state, CityId(id)).await {
        Ok(Some((city, temperature))) => Json(CityWeatherResponse {
            city: city.name,
            temperature,
        })
        .into_response(),
        Ok(None) => cities_error_response(&CitiesError::CityNotFound(id.to_string())),
        Err(e) => cities_error_response(&e),
    }
}
