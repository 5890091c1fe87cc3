//! Coordinate resolution for city records.
//!
//! Coordinates have been stored under several attribute names over time.
//! The names are kept as ordered lists and probed front to back; latitude
//! and longitude are resolved independently. When either side is missing
//! (or does not parse as a valid degree value) the city's display name is
//! used for a name-based lookup instead.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use cities_common::{CityId, CityRecord, Coordinates};
use storage::MetadataStore;

/// What the upstream API should be queried with.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupTarget {
    Coordinates(Coordinates),
    Name(String),
}

/// Attribute names probed for each coordinate, highest priority first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinateKeys {
    #[serde(default = "default_latitude_keys")]
    pub latitude: Vec<String>,

    #[serde(default = "default_longitude_keys")]
    pub longitude: Vec<String>,
}

impl Default for CoordinateKeys {
    fn default() -> Self {
        Self {
            latitude: default_latitude_keys(),
            longitude: default_longitude_keys(),
        }
    }
}

fn default_latitude_keys() -> Vec<String> {
    vec![
        "_latitude".to_string(),
        "latitude".to_string(),
        "_city_latitude".to_string(),
    ]
}

fn default_longitude_keys() -> Vec<String> {
    vec![
        "_longitude".to_string(),
        "longitude".to_string(),
        "_city_longitude".to_string(),
    ]
}

/// Resolves a city to coordinates or a name fallback.
#[derive(Clone)]
pub struct CoordinateResolver {
    metadata: Arc<dyn MetadataStore>,
    keys: CoordinateKeys,
}

impl CoordinateResolver {
    pub fn new(metadata: Arc<dyn MetadataStore>, keys: CoordinateKeys) -> Self {
        Self { metadata, keys }
    }

    pub fn keys(&self) -> &CoordinateKeys {
        &self.keys
    }

    /// Resolve the lookup target for a city.
    ///
    /// Returns `None` only when there are no usable coordinates and the
    /// display name is blank, i.e. there is nothing to ask upstream about.
    pub async fn resolve(&self, city: &CityRecord) -> Option<LookupTarget> {
        if let Some(coords) = self.coordinates(city.id).await {
            return Some(LookupTarget::Coordinates(coords));
        }

        let name = city.name.trim();
        if name.is_empty() {
            debug!(city_id = %city.id, "City has neither coordinates nor a name");
            None
        } else {
            Some(LookupTarget::Name(name.to_string()))
        }
    }

    /// Coordinates for a city when both sides are present and valid.
    pub async fn coordinates(&self, id: CityId) -> Option<Coordinates> {
        let latitude = self.first_present(id, &self.keys.latitude).await?;
        let longitude = self.first_present(id, &self.keys.longitude).await?;

        let coords = Coordinates::parse(&latitude, &longitude);
        if coords.is_none() {
            warn!(
                city_id = %id,
                latitude = %latitude,
                longitude = %longitude,
                "Stored coordinates are not valid degree values, falling back to name"
            );
        }
        coords
    }

    async fn first_present(&self, id: CityId, keys: &[String]) -> Option<String> {
        for key in keys {
            match self.metadata.get_meta(id, key).await {
                Ok(Some(value)) => return Some(value),
                Ok(None) => continue,
                Err(e) => {
                    warn!(city_id = %id, key = %key, error = %e, "Metadata lookup failed");
                }
            }
        }
        None
    }
}
