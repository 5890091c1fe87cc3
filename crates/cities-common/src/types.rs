//! Domain types shared by storage, the weather pipeline and the HTTP layer.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Placeholder shown in place of a temperature that could not be resolved.
pub const UNAVAILABLE: &str = "N/A";

/// Placeholder shown for a city without any country label.
pub const NO_COUNTRY: &str = "-";

/// Message carried by the empty-result indicator.
pub const NO_RESULTS_MESSAGE: &str = "No results";

/// Stable identifier of a city record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CityId(pub i64);

impl fmt::Display for CityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for CityId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Publication state of a city record. Only published cities are visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CityStatus {
    #[default]
    #[serde(alias = "publish")]
    Published,
    Draft,
    Private,
    Trash,
}

impl CityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Published => "publish",
            Self::Draft => "draft",
            Self::Private => "private",
            Self::Trash => "trash",
        }
    }

    pub fn is_published(&self) -> bool {
        matches!(self, Self::Published)
    }
}

/// A published city as returned by a city store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityRecord {
    pub id: CityId,
    pub name: String,
    /// Country labels in storage order.
    #[serde(default)]
    pub countries: Vec<String>,
}

impl CityRecord {
    pub fn new(id: impl Into<CityId>, name: impl Into<String>, countries: Vec<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            countries,
        }
    }

    /// Country labels joined for display, or `-` when the city has none.
    pub fn country_label(&self) -> String {
        let labels: Vec<&str> = self
            .countries
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .collect();

        if labels.is_empty() {
            NO_COUNTRY.to_string()
        } else {
            labels.join(", ")
        }
    }
}

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Build a coordinate pair, rejecting values outside the valid ranges.
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        let lat_ok = latitude.is_finite() && (-90.0..=90.0).contains(&latitude);
        let lon_ok = longitude.is_finite() && (-180.0..=180.0).contains(&longitude);

        if lat_ok && lon_ok {
            Some(Self {
                latitude,
                longitude,
            })
        } else {
            None
        }
    }

    /// Parse stored text values such as `"52.52"` and `" 13.405 "`.
    pub fn parse(latitude: &str, longitude: &str) -> Option<Self> {
        let lat = latitude.trim().parse::<f64>().ok()?;
        let lon = longitude.trim().parse::<f64>().ok()?;
        Self::new(lat, lon)
    }
}

/// Result of a temperature lookup: a reading in Celsius or the sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Temperature {
    Celsius(f64),
    #[default]
    Unavailable,
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Celsius(v) => write!(f, "{} °C", v),
            Self::Unavailable => f.write_str(UNAVAILABLE),
        }
    }
}

impl Serialize for Temperature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Round half away from zero to one decimal place.
pub fn round_to_tenth(value: f64) -> f64 {
    // Adding +0.0 folds -0.0 into 0.0 so "-0 °C" is never displayed.
    (value * 10.0).round() / 10.0 + 0.0
}

/// One output row: country label(s), city name, temperature or sentinel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub country: String,
    pub city: String,
    pub temperature: Temperature,
}

impl Row {
    pub fn new(city: &CityRecord, temperature: Temperature) -> Self {
        Self {
            country: city.country_label(),
            city: city.name.clone(),
            temperature,
        }
    }
}

/// Rows for a request, or the explicit empty-result indicator.
#[derive(Debug, Clone, PartialEq)]
pub enum RowSet {
    Rows(Vec<Row>),
    NoResults,
}

impl RowSet {
    pub fn from_rows(rows: Vec<Row>) -> Self {
        if rows.is_empty() {
            Self::NoResults
        } else {
            Self::Rows(rows)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::NoResults)
    }
}

#[derive(Serialize)]
struct NoResultsBody {
    no_results: bool,
    message: &'static str,
}

impl Serialize for RowSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Rows(rows) => rows.serialize(serializer),
            Self::NoResults => NoResultsBody {
                no_results: true,
                message: NO_RESULTS_MESSAGE,
            }
            .serialize(serializer),
        }
    }
}
