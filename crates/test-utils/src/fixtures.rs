//! Common test fixtures for city-temps tests.
//!
//! This module provides pre-defined cities covering the coordinate storage
//! variants seen in real catalogs.

use std::collections::BTreeMap;

use cities_common::CityStatus;
use storage::{MemoryCatalog, SeedCity};

/// Upstream response bodies.
pub mod payloads {
    /// A normal current-weather body with `main.temp = 18.46`.
    pub const TEMP_18_46: &str = r#"{"coord":{"lon":13.41,"lat":52.52},"main":{"temp":18.46,"humidity":60},"name":"Berlin"}"#;

    /// Body without a `main` block.
    pub const NO_MAIN: &str = r#"{"cod":200,"name":"Berlin"}"#;

    /// OpenWeatherMap error body for an unknown place name.
    pub const CITY_NOT_FOUND: &str = r#"{"cod":"404","message":"city not found"}"#;

    /// Build a body with the given temperature.
    pub fn with_temp(temp: f64) -> String {
        format!(r#"{{"main":{{"temp":{}}}}}"#, temp)
    }
}

/// Build a seed city with optional metadata pairs.
pub fn seed_city(id: i64, name: &str, countries: &[&str], meta: &[(&str, &str)]) -> SeedCity {
    SeedCity {
        id,
        name: name.to_string(),
        countries: countries.iter().map(|c| c.to_string()).collect(),
        status: CityStatus::Published,
        meta: meta
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<BTreeMap<_, _>>(),
    }
}

/// Berlin with coordinates under the primary keys.
pub fn berlin() -> SeedCity {
    seed_city(
        1,
        "Berlin",
        &["Germany"],
        &[("_latitude", "52.52"), ("_longitude", "13.405")],
    )
}

/// Hamburg with coordinates under the un-prefixed legacy keys.
pub fn hamburg() -> SeedCity {
    seed_city(
        2,
        "Hamburg",
        &["Germany"],
        &[("latitude", "53.55"), ("longitude", "9.99")],
    )
}

/// Paris without coordinates, forcing a name lookup.
pub fn paris() -> SeedCity {
    seed_city(3, "Paris", &["France"], &[])
}

/// A draft city that must never be visible.
pub fn draft_bern() -> SeedCity {
    let mut city = seed_city(
        4,
        "Bern",
        &["Switzerland"],
        &[("_city_latitude", "46.95"), ("_city_longitude", "7.45")],
    );
    city.status = CityStatus::Draft;
    city
}

/// Catalog with Berlin, Hamburg, Paris and a draft Bern.
pub fn sample_catalog() -> MemoryCatalog {
    MemoryCatalog::new(vec![berlin(), hamburg(), paris(), draft_bern()])
}
