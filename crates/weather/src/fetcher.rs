//! Upstream current-weather client.
//!
//! This is the only module that performs network I/O and the only one that
//! knows the OpenWeatherMap request/response shape. Every failure mode
//! (missing API key, transport error, timeout, non-200 status, malformed or
//! incomplete body) is reported as a [`FetchFailure`] value.

use async_trait::async_trait;
use metrics::{counter, histogram};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use cities_common::{round_to_tenth, CitiesError, CitiesResult};

use crate::coordinates::LookupTarget;

/// Units system sent upstream. Readings are always Celsius.
pub const UNITS: &str = "metric";

/// Default upstream base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

/// Why a fetch produced no reading.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchFailure {
    #[error("no API key configured")]
    MissingApiKey,

    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("upstream returned HTTP {0}")]
    Status(u16),

    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("payload has no temperature")]
    MissingTemperature,
}

impl FetchFailure {
    /// Label used for the `outcome` metric dimension.
    pub fn label(&self) -> &'static str {
        match self {
            Self::MissingApiKey => "missing_api_key",
            Self::Timeout => "timeout",
            Self::Transport(_) => "transport",
            Self::Status(_) => "status",
            Self::MalformedPayload(_) => "malformed",
            Self::MissingTemperature => "missing_temperature",
        }
    }
}

/// Source of current temperature readings.
#[async_trait]
pub trait WeatherFetcher: Send + Sync {
    /// Fetch the current temperature in Celsius, rounded to one decimal.
    async fn fetch(&self, target: &LookupTarget) -> Result<f64, FetchFailure>;
}

/// Settings for [`OpenWeatherClient`].
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Scheme and host of the API, without a trailing path.
    pub base_url: String,
    /// API credential. Empty disables upstream calls.
    pub api_key: String,
    /// Bound on the whole request.
    pub timeout: Duration,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Current weather payload. Only the fields we read are modeled.
#[derive(Debug, Deserialize)]
struct CurrentWeather {
    main: Option<MainReadings>,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    temp: Option<f64>,
}

/// Extract and round the temperature from a response body.
pub fn parse_temperature(body: &str) -> Result<f64, FetchFailure> {
    let payload: CurrentWeather =
        serde_json::from_str(body).map_err(|e| FetchFailure::MalformedPayload(e.to_string()))?;

    match payload.main.and_then(|m| m.temp) {
        Some(temp) if temp.is_finite() => Ok(round_to_tenth(temp)),
        _ => Err(FetchFailure::MissingTemperature),
    }
}

/// OpenWeatherMap current-weather client.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl OpenWeatherClient {
    pub fn new(config: FetcherConfig) -> CitiesResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(8)
            .tcp_nodelay(true)
            .build()
            .map_err(|e| {
                CitiesError::ConfigError(format!("Failed to create HTTP client: {}", e))
            })?;

        if config.api_key.trim().is_empty() {
            warn!("No weather API key configured, temperatures will be unavailable");
        }

        Ok(Self {
            client,
            endpoint: format!("{}/data/2.5/weather", config.base_url.trim_end_matches('/')),
            api_key: config.api_key.trim().to_string(),
        })
    }

    fn query(&self, target: &LookupTarget) -> Vec<(&'static str, String)> {
        let mut params = match target {
            LookupTarget::Coordinates(c) => vec![
                ("lat", c.latitude.to_string()),
                ("lon", c.longitude.to_string()),
            ],
            LookupTarget::Name(name) => vec![("q", name.clone())],
        };
        params.push(("units", UNITS.to_string()));
        params.push(("appid", self.api_key.clone()));
        params
    }

    async fn request(&self, target: &LookupTarget) -> Result<f64, FetchFailure> {
        if self.api_key.is_empty() {
            return Err(FetchFailure::MissingApiKey);
        }

        let response = self
            .client
            .get(&self.endpoint)
            .query(&self.query(target))
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchFailure::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(classify_transport_error)?;
        parse_temperature(&body)
    }
}

fn classify_transport_error(err: reqwest::Error) -> FetchFailure {
    if err.is_timeout() {
        FetchFailure::Timeout
    } else {
        FetchFailure::Transport(err.to_string())
    }
}

#[async_trait]
impl WeatherFetcher for OpenWeatherClient {
    #[instrument(skip(self), fields(by = target_kind(target)))]
    async fn fetch(&self, target: &LookupTarget) -> Result<f64, FetchFailure> {
        let start = Instant::now();
        let result = self.request(target).await;
        histogram!("weather_fetch_duration_seconds").record(start.elapsed().as_secs_f64());

        match &result {
            Ok(celsius) => {
                counter!("weather_fetch_total", "outcome" => "ok").increment(1);
                debug!(celsius = *celsius, "Fetched temperature");
            }
            Err(failure) => {
                counter!("weather_fetch_total", "outcome" => failure.label()).increment(1);
                warn!(error = %failure, "Weather fetch failed");
            }
        }

        result
    }
}

fn target_kind(target: &LookupTarget) -> &'static str {
    match target {
        LookupTarget::Coordinates(_) => "coordinates",
        LookupTarget::Name(_) => "name",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cities_common::Coordinates;

    #[test]
    fn test_parse_rounds_to_one_decimal() {
        assert_eq!(parse_temperature(r#"{"main":{"temp":18.46}}"#), Ok(18.5));
        assert_eq!(parse_temperature(r#"{"main":{"temp":-7}}"#), Ok(-7.0));
    }

    #[test]
    fn test_parse_zero_is_a_reading() {
        assert_eq!(parse_temperature(r#"{"main":{"temp":0}}"#), Ok(0.0));
    }

    #[test]
    fn test_parse_missing_temperature() {
        assert_eq!(
            parse_temperature(r#"{"main":{"humidity":80}}"#),
            Err(FetchFailure::MissingTemperature)
        );
        assert_eq!(
            parse_temperature(r#"{"cod":"404","message":"city not found"}"#),
            Err(FetchFailure::MissingTemperature)
        );
        assert_eq!(
            parse_temperature(r#"{"main":{"temp":null}}"#),
            Err(FetchFailure::MissingTemperature)
        );
    }

    #[test]
    fn test_parse_non_numeric_temperature() {
        assert!(matches!(
            parse_temperature(r#"{"main":{"temp":"warm"}}"#),
            Err(FetchFailure::MalformedPayload(_))
        ));
        assert!(matches!(
            parse_temperature("<html>bad gateway</html>"),
            Err(FetchFailure::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_query_by_coordinates() {
        let client = OpenWeatherClient::new(FetcherConfig {
            api_key: "secret".into(),
            ..Default::default()
        })
        .unwrap();

        let target = LookupTarget::Coordinates(Coordinates {
            latitude: 52.52,
            longitude: 13.405,
        });
        let params = client.query(&target);

        assert_eq!(
            params,
            vec![
                ("lat", "52.52".to_string()),
                ("lon", "13.405".to_string()),
                ("units", "metric".to_string()),
                ("appid", "secret".to_string()),
            ]
        );
    }

    #[test]
    fn test_query_by_name() {
        let client = OpenWeatherClient::new(FetcherConfig {
            api_key: "secret".into(),
            ..Default::default()
        })
        .unwrap();

        let params = client.query(&LookupTarget::Name("Paris".into()));
        assert_eq!(params[0], ("q", "Paris".to_string()));
        assert!(params.iter().all(|(k, _)| *k != "lat" && *k != "lon"));
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let client = OpenWeatherClient::new(FetcherConfig {
            base_url: "http://localhost:9999/".into(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(client.endpoint, "http://localhost:9999/data/2.5/weather");
    }

    #[tokio::test]
    async fn test_missing_api_key_skips_network() {
        let client = OpenWeatherClient::new(FetcherConfig {
            // Nothing listens here; a request would fail with a transport error.
            base_url: "http://127.0.0.1:9".into(),
            api_key: "  ".into(),
            timeout: Duration::from_millis(100),
        })
        .unwrap();

        let result = client.fetch(&LookupTarget::Name("Paris".into())).await;
        assert_eq!(result, Err(FetchFailure::MissingApiKey));
    }
}
