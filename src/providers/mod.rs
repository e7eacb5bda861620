//! Geocoding provider clients.
//!
//! # Data Flow
//! ```text
//! PostalCode + TraceContext
//!     → brasil_api.rs / via_cep.rs (one GET each, traceparent attached)
//!     → provider-specific JSON
//!     → Location (normalized) | ProviderError
//! ```
//!
//! # Design Decisions
//! - Providers are interchangeable behind `LocationProvider`
//! - Every failure kind collapses to "no usable answer" in the resolver;
//!   the variants exist for logs and metrics only
//! - No retries: the first failure is terminal for that provider

pub mod brasil_api;
pub mod via_cep;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::cep::{Location, PostalCode};
use crate::observability::TraceContext;

pub use brasil_api::BrasilApiProvider;
pub use via_cep::ViaCepProvider;

/// Why a provider produced no location.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream returned status {0}")]
    Status(u16),

    #[error("malformed response body: {0}")]
    Decode(String),

    #[error("postal code not found")]
    NotFound,
}

impl ProviderError {
    /// Label used in metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::Transport(_) => "transport",
            ProviderError::Status(_) => "status",
            ProviderError::Decode(_) => "decode",
            ProviderError::NotFound => "not_found",
        }
    }
}

/// A geocoding source that resolves a postal code to a location.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Stable name for logs and metrics.
    fn name(&self) -> &'static str;

    /// Resolve `code`, attaching `trace` to the outbound call.
    async fn fetch(&self, code: &PostalCode, trace: &TraceContext) -> Result<Location, ProviderError>;
}

/// Build the HTTP client shared by the provider clients of one process.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("cep-temp/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Drop blank strings reported by providers for unknown fields.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
