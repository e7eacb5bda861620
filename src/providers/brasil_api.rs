//! BrasilAPI CEP client.

use async_trait::async_trait;
use serde::Deserialize;

use crate::cep::{Location, PostalCode};
use crate::observability::trace::{TraceContext, TRACEPARENT};
use crate::providers::{non_empty, LocationProvider, ProviderError};

#[derive(Debug, Deserialize)]
struct BrasilApiResponse {
    state: Option<String>,
    city: Option<String>,
    neighborhood: Option<String>,
}

/// Client for `GET {base_url}/{cep}`.
#[derive(Debug, Clone)]
pub struct BrasilApiProvider {
    client: reqwest::Client,
    base_url: String,
}

impl BrasilApiProvider {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, code: &PostalCode) -> String {
        format!("{}/{}", self.base_url, code)
    }
}

#[async_trait]
impl LocationProvider for BrasilApiProvider {
    fn name(&self) -> &'static str {
        "brasilapi"
    }

    async fn fetch(&self, code: &PostalCode, trace: &TraceContext) -> Result<Location, ProviderError> {
        let response = self
            .client
            .get(self.url(code))
            .header(TRACEPARENT, trace.to_traceparent())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(provider = self.name(), cep = %code, status = %status, "Provider returned non-success status");
            return Err(ProviderError::Status(status.as_u16()));
        }

        let body: BrasilApiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;

        Ok(Location {
            postal_code: code.clone(),
            district: non_empty(body.neighborhood),
            state: non_empty(body.state),
            city: non_empty(body.city),
        })
    }
}
