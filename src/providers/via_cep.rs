//! ViaCEP client.
//!
//! ViaCEP answers unknown codes with `200 {"erro": true}` (older deployments
//! send the string `"true"`), so the body has to be inspected before it can
//! be trusted.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::cep::{Location, PostalCode};
use crate::observability::trace::{TraceContext, TRACEPARENT};
use crate::providers::{non_empty, LocationProvider, ProviderError};

#[derive(Debug, Deserialize)]
struct ViaCepResponse {
    bairro: Option<String>,
    localidade: Option<String>,
    uf: Option<String>,
    erro: Option<Value>,
}

impl ViaCepResponse {
    fn is_not_found(&self) -> bool {
        match &self.erro {
            Some(Value::Bool(flag)) => *flag,
            Some(Value::String(flag)) => flag.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }
}

/// Client for `GET {base_url}/{cep}/json`.
#[derive(Debug, Clone)]
pub struct ViaCepProvider {
    client: reqwest::Client,
    base_url: String,
}

impl ViaCepProvider {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, code: &PostalCode) -> String {
        format!("{}/{}/json", self.base_url, code)
    }
}

#[async_trait]
impl LocationProvider for ViaCepProvider {
    fn name(&self) -> &'static str {
        "viacep"
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

        let body: ViaCepResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;

        if body.is_not_found() {
            return Err(ProviderError::NotFound);
        }

        Ok(Location {
            postal_code: code.clone(),
            district: non_empty(body.bairro),
            state: non_empty(body.uf),
            city: non_empty(body.localidade),
        })
    }
}
