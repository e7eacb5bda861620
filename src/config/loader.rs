//! Configuration loading from disk and environment.

use std::fs;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{Role, ServiceConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Environment variable {var}: {reason}")]
    Env { var: &'static str, reason: String },

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration for `role`: optional TOML file, then environment
/// overrides, then validation.
pub fn load_config(path: Option<&Path>, role: Role) -> Result<ServiceConfig, ConfigError> {
    let mut config = match path {
        Some(path) => parse_file(path)?,
        None => ServiceConfig::default(),
    };

    apply_env(&mut config, role, |key| std::env::var(key).ok())?;
    validate_config(&config, role).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Parse a TOML file without validating it.
pub fn parse_file(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Overlay environment variables onto `config`.
///
/// `PORT` applies to the listener of the running role only.
pub fn apply_env<F>(config: &mut ServiceConfig, role: Role, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(port) = lookup("PORT") {
        let port: u16 = port.trim().parse().map_err(|e| ConfigError::Env {
            var: "PORT",
            reason: format!("'{port}' is not a port number ({e})"),
        })?;
        let bind = config.bind_address_mut(role);
        let ip = bind
            .parse::<SocketAddr>()
            .map(|addr| addr.ip())
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        *bind = SocketAddr::new(ip, port).to_string();
    }

    let overrides: [(&str, &mut String); 5] = [
        ("SERVICE_B_URL", &mut config.edge.resolver_url),
        ("WEATHER_API_KEY", &mut config.providers.weather_api_key),
        ("BRASIL_API_URL", &mut config.providers.brasil_api_url),
        ("VIA_CEP_URL", &mut config.providers.via_cep_url),
        ("WEATHER_API_URL", &mut config.providers.weather_api_url),
    ];
    for (var, field) in overrides {
        if let Some(value) = lookup(var).filter(|v| !v.is_empty()) {
            *field = value;
        }
    }

    if let Some(name) = lookup("OTEL_SERVICE_NAME").filter(|v| !v.is_empty()) {
        config.observability.service_name = Some(name);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: ServiceConfig = toml::from_str(
            r#"
            [edge]
            resolver_url = "http://resolver:8081/"

            [timeouts]
            resolve_deadline_secs = 3

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.edge.resolver_url, "http://resolver:8081/");
        assert_eq!(config.edge.bind_address, "0.0.0.0:8080");
        assert_eq!(config.timeouts.resolve_deadline_secs, 3);
        assert_eq!(config.timeouts.upstream_secs, 10);
        assert_eq!(config.timeouts.forward_secs, 25);
        assert_eq!(config.observability.log_format, crate::config::LogFormat::Json);
    }

    #[test]
    fn test_port_applies_to_running_role() {
        let mut config = ServiceConfig::default();
        config.resolver.bind_address = "127.0.0.1:8081".into();
        apply_env(&mut config, Role::Resolver, env(&[("PORT", "9000")])).unwrap();
        assert_eq!(config.resolver.bind_address, "127.0.0.1:9000");
        assert_eq!(config.edge.bind_address, "0.0.0.0:8080");
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let mut config = ServiceConfig::default();
        let err = apply_env(&mut config, Role::Edge, env(&[("PORT", "http")])).unwrap_err();
        assert!(matches!(err, ConfigError::Env { var: "PORT", .. }));
    }

    #[test]
    fn test_env_overrides_urls_and_key() {
        let mut config = ServiceConfig::default();
        apply_env(
            &mut config,
            Role::Resolver,
            env(&[
                ("WEATHER_API_KEY", "k123"),
                ("SERVICE_B_URL", "http://service-b:8081"),
                ("VIA_CEP_URL", "http://localhost:9999/ws"),
                ("BRASIL_API_URL", ""),
                ("OTEL_SERVICE_NAME", "service-b"),
            ]),
        )
        .unwrap();

        assert_eq!(config.providers.weather_api_key, "k123");
        assert_eq!(config.edge.resolver_url, "http://service-b:8081");
        assert_eq!(config.providers.via_cep_url, "http://localhost:9999/ws");
        // Empty values leave defaults alone.
        assert_eq!(config.providers.brasil_api_url, "https://brasilapi.com.br/api/cep/v1");
        assert_eq!(config.observability.service_name(Role::Resolver), "service-b");
    }

    #[test]
    fn test_default_service_name_follows_role() {
        let config = ServiceConfig::default();
        assert_eq!(config.observability.service_name(Role::Edge), "cep-edge");
        assert_eq!(config.observability.service_name(Role::Resolver), "cep-resolver");
    }

    #[test]
    fn test_validation_error_lists_all_problems() {
        let err = ConfigError::Validation(vec![
            ValidationError::Missing("providers.weather_api_key"),
            ValidationError::ZeroDuration("timeouts.request_secs"),
        ]);
        assert_eq!(
            err.to_string(),
            "Validation failed: providers.weather_api_key must be set, timeouts.request_secs must be greater than zero"
        );
    }
}
