//! Metrics collection and exposition.
//!
//! # Metrics
//! - `cep_requests_total` (counter): requests by hop and status
//! - `cep_request_duration_seconds` (histogram): latency by hop
//! - `cep_provider_responses_total` (counter): provider replies by outcome
//! - `cep_resolutions_total` (counter): resolver outcomes
//! - `cep_weather_lookups_total` (counter): weather lookups by outcome
//!
//! Without an installed recorder every call here is a no-op, which keeps
//! tests free of global state.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one finished request on a hop.
pub fn record_request(hop: &'static str, status: u16, start: Instant) {
    metrics::counter!("cep_requests_total", "hop" => hop, "status" => status.to_string())
        .increment(1);
    metrics::histogram!("cep_request_duration_seconds", "hop" => hop)
        .record(start.elapsed().as_secs_f64());
}

/// Record how one provider answered, whether or not its answer was used.
pub fn record_provider_response(provider: &'static str, outcome: &'static str) {
    metrics::counter!("cep_provider_responses_total", "provider" => provider, "outcome" => outcome)
        .increment(1);
}

/// Record the resolver's decision for one request.
pub fn record_resolution(outcome: &'static str) {
    metrics::counter!("cep_resolutions_total", "outcome" => outcome).increment(1);
}

pub fn record_weather_lookup(outcome: &'static str) {
    metrics::counter!("cep_weather_lookups_total", "outcome" => outcome).increment(1);
}
