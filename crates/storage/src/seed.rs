//! YAML seed documents describing city records.
//!
//! ```yaml
//! cities:
//!   - id: 1
//!     name: Berlin
//!     countries: [Germany]
//!     meta:
//!       _latitude: "52.52"
//!       _longitude: "13.405"
//!   - id: 2
//!     name: Paris
//!     countries: [France]
//!     status: draft
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use cities_common::{CitiesError, CitiesResult, CityId, CityRecord, CityStatus};

/// Root of a seed file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CitySeed {
    #[serde(default)]
    pub cities: Vec<SeedCity>,
}

/// A single city entry in a seed file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedCity {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub countries: Vec<String>,
    #[serde(default)]
    pub status: CityStatus,
    /// Free-form attributes, including any of the coordinate key variants.
    #[serde(default)]
    pub meta: BTreeMap<String, String>,
}

impl SeedCity {
    pub fn record(&self) -> CityRecord {
        CityRecord {
            id: CityId(self.id),
            name: self.name.clone(),
            countries: self.countries.clone(),
        }
    }
}

impl CitySeed {
    /// Parse a seed document from YAML text.
    pub fn from_yaml_str(content: &str) -> CitiesResult<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| CitiesError::SeedError(format!("Failed to parse seed: {}", e)))
    }

    /// Read and parse a seed file.
    pub fn load(path: &Path) -> CitiesResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CitiesError::SeedError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&content)
    }
}
