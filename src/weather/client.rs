//! WeatherAPI current-conditions client.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::observability::trace::{TraceContext, TRACEPARENT};

/// Current temperature for a city.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureReading {
    pub celsius: f64,
}

/// Errors from the weather provider. All of them are terminal for a request.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("weather provider returned status {0}")]
    Status(u16),

    #[error("malformed weather response: {0}")]
    Decode(String),
}

/// A source of current temperatures keyed by city name.
#[async_trait]
pub trait TemperatureSource: Send + Sync {
    async fn fetch_temperature(
        &self,
        city: &str,
        trace: &TraceContext,
    ) -> Result<TemperatureReading, WeatherError>;
}

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    current: Current,
}

#[derive(Debug, Deserialize)]
struct Current {
    temp_c: f64,
}

/// Client for `GET {base_url}/current.json?key=..&q=<city>`.
#[derive(Clone)]
pub struct WeatherApiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl std::fmt::Debug for WeatherApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl WeatherApiClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl TemperatureSource for WeatherApiClient {
    async fn fetch_temperature(
        &self,
        city: &str,
        trace: &TraceContext,
    ) -> Result<TemperatureReading, WeatherError> {
        // reqwest percent-encodes the query, so city names with spaces and
        // accents are sent as-is here.
        let response = self
            .client
            .get(format!("{}/current.json", self.base_url))
            .query(&[("key", self.api_key.as_str()), ("q", city)])
            .header(TRACEPARENT, trace.to_traceparent())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(city = %city, status = %status, "Weather provider returned non-success status");
            return Err(WeatherError::Status(status.as_u16()));
        }

        let body: CurrentResponse = response
            .json()
            .await
            .map_err(|e| WeatherError::Decode(e.to_string()))?;

        Ok(TemperatureReading {
            celsius: body.current.temp_c,
        })
    }
}
