//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for both hops.
//! All types derive Serde traits for deserialization from config files.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which hop this process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Front-facing hop: validates and forwards.
    Edge,
    /// Races the geocoding providers and looks up the temperature.
    Resolver,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Edge => "edge",
            Role::Resolver => "resolver",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Root configuration shared by both hops.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Edge hop settings.
    pub edge: EdgeConfig,

    /// Resolution hop settings.
    pub resolver: ResolverConfig,

    /// Upstream provider endpoints.
    pub providers: ProvidersConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl ServiceConfig {
    /// Listen address of the given role.
    pub fn bind_address(&self, role: Role) -> &str {
        match role {
            Role::Edge => &self.edge.bind_address,
            Role::Resolver => &self.resolver.bind_address,
        }
    }

    pub fn bind_address_mut(&mut self, role: Role) -> &mut String {
        match role {
            Role::Edge => &mut self.edge.bind_address,
            Role::Resolver => &mut self.resolver.bind_address,
        }
    }
}

/// Edge hop configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EdgeConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// URL the edge forwards requests to (plain HTTP).
    pub resolver_url: String,

    /// Maximum accepted request body in bytes.
    pub max_body_bytes: usize,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            resolver_url: "http://localhost:8081/".to_string(),
            max_body_bytes: 16 * 1024,
        }
    }
}

/// Resolution hop configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Bind address (e.g., "0.0.0.0:8081").
    pub bind_address: String,

    /// Maximum accepted request body in bytes.
    pub max_body_bytes: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8081".to_string(),
            max_body_bytes: 16 * 1024,
        }
    }
}

/// Geocoding and weather provider endpoints.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProvidersConfig {
    /// BrasilAPI base URL; the CEP is appended as a path segment.
    pub brasil_api_url: String,

    /// ViaCEP base URL; requests go to `{base}/{cep}/json`.
    pub via_cep_url: String,

    /// WeatherAPI base URL; requests go to `{base}/current.json`.
    pub weather_api_url: String,

    /// WeatherAPI key. Usually supplied through `WEATHER_API_KEY`.
    pub weather_api_key: String,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            brasil_api_url: "https://brasilapi.com.br/api/cep/v1".to_string(),
            via_cep_url: "https://viacep.com.br/ws".to_string(),
            weather_api_url: "https://api.weatherapi.com/v1".to_string(),
            weather_api_key: String::new(),
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Whole-request timeout enforced by each hop's middleware.
    pub request_secs: u64,

    /// Deadline shared by both geocoding providers.
    pub resolve_deadline_secs: u64,

    /// Per-call timeout for the resolution hop's outbound HTTP (providers,
    /// weather lookup).
    pub upstream_secs: u64,

    /// How long the edge waits for the resolution hop. Must outlast the
    /// provider deadline plus the weather lookup, or a resolver timeout
    /// surfaces as an edge 500 instead of the resolver's 404.
    pub forward_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            resolve_deadline_secs: 10,
            upstream_secs: 10,
            forward_secs: 25,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Service name reported on spans; defaults to the role name.
    pub service_name: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Report spans of traces started at this hop.
    pub trace_sampled: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl ObservabilityConfig {
    pub fn service_name(&self, role: Role) -> String {
        self.service_name
            .clone()
            .unwrap_or_else(|| format!("cep-{}", role.as_str()))
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: None,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            trace_sampled: true,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
