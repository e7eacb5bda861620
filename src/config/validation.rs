//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, URLs and value ranges for the running role
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function of (config, role)
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::{Role, ServiceConfig};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: '{value}' is not a socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field}: '{value}' is not a valid URL ({reason})")]
    InvalidUrl {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("{field}: scheme '{scheme}' is not supported")]
    UnsupportedScheme { field: &'static str, scheme: String },

    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    #[error("{field} ({value}s) must exceed {bound} ({limit}s)")]
    TimeoutTooShort {
        field: &'static str,
        value: u64,
        bound: &'static str,
        limit: u64,
    },
}

/// Check the configuration for the given role.
pub fn validate_config(config: &ServiceConfig, role: Role) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroDuration("timeouts.request_secs"));
    }
    if config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError::ZeroDuration("timeouts.upstream_secs"));
    }
    if config.observability.metrics_enabled {
        check_address(
            "observability.metrics_address",
            &config.observability.metrics_address,
            &mut errors,
        );
    }

    let timeouts = &config.timeouts;
    // Worst case of one resolution: provider deadline, then the weather call.
    let resolution_secs = timeouts.resolve_deadline_secs.saturating_add(timeouts.upstream_secs);

    match role {
        Role::Edge => {
            check_address("edge.bind_address", &config.edge.bind_address, &mut errors);
            // The forwarding client speaks plain HTTP only.
            check_url("edge.resolver_url", &config.edge.resolver_url, &["http"], &mut errors);
            check_exceeds(
                "timeouts.forward_secs",
                timeouts.forward_secs,
                "timeouts.resolve_deadline_secs + timeouts.upstream_secs",
                resolution_secs,
                &mut errors,
            );
            check_exceeds(
                "timeouts.request_secs",
                timeouts.request_secs,
                "timeouts.forward_secs",
                timeouts.forward_secs,
                &mut errors,
            );
        }
        Role::Resolver => {
            check_address("resolver.bind_address", &config.resolver.bind_address, &mut errors);
            let providers = &config.providers;
            for (field, value) in [
                ("providers.brasil_api_url", &providers.brasil_api_url),
                ("providers.via_cep_url", &providers.via_cep_url),
                ("providers.weather_api_url", &providers.weather_api_url),
            ] {
                check_url(field, value, &["http", "https"], &mut errors);
            }
            if providers.weather_api_key.trim().is_empty() {
                errors.push(ValidationError::Missing("providers.weather_api_key"));
            }
            if timeouts.resolve_deadline_secs == 0 {
                errors.push(ValidationError::ZeroDuration("timeouts.resolve_deadline_secs"));
            }
            check_exceeds(
                "timeouts.request_secs",
                timeouts.request_secs,
                "timeouts.resolve_deadline_secs + timeouts.upstream_secs",
                resolution_secs,
                &mut errors,
            );
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

fn check_exceeds(
    field: &'static str,
    value: u64,
    bound: &'static str,
    limit: u64,
    errors: &mut Vec<ValidationError>,
) {
    if value <= limit {
        errors.push(ValidationError::TimeoutTooShort {
            field,
            value,
            bound,
            limit,
        });
    }
}

fn check_url(field: &'static str, value: &str, schemes: &[&str], errors: &mut Vec<ValidationError>) {
    match Url::parse(value) {
        Ok(url) if !schemes.contains(&url.scheme()) => {
            errors.push(ValidationError::UnsupportedScheme {
                field,
                scheme: url.scheme().to_string(),
            });
        }
        Ok(_) => {}
        Err(e) => errors.push(ValidationError::InvalidUrl {
            field,
            value: value.to_string(),
            reason: e.to_string(),
        }),
    }
}
