//! Resolution hop pipeline: validate, resolve, enrich.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::cep::PostalCode;
use crate::observability::{metrics, SpanScope};
use crate::pipeline::model::TemperatureResponse;
use crate::resolver::{RedundantResolver, ResolveError};
use crate::weather::{TemperatureSource, WeatherError};

/// Request states, strictly sequential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Validated,
    Resolving,
    Resolved,
    Enriching,
    Responded,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Received => "received",
            Stage::Validated => "validated",
            Stage::Resolving => "resolving",
            Stage::Resolved => "resolved",
            Stage::Enriching => "enriching",
            Stage::Responded => "responded",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ways the pipeline can short-circuit to an error response.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid zipcode")]
    MalformedInput,

    #[error("no provider found the postal code")]
    NoLocationFound,

    #[error("no provider replied before the deadline")]
    ResolutionTimeout,

    #[error("failed to get temperature: {0}")]
    EnrichmentFailure(#[from] WeatherError),
}

impl PipelineError {
    /// The stage the request was in when it failed.
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::MalformedInput => Stage::Validated,
            PipelineError::NoLocationFound | PipelineError::ResolutionTimeout => Stage::Resolving,
            PipelineError::EnrichmentFailure(_) => Stage::Enriching,
        }
    }
}

impl From<ResolveError> for PipelineError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::NotFound => PipelineError::NoLocationFound,
            ResolveError::Timeout => PipelineError::ResolutionTimeout,
        }
    }
}

/// Composes validation, the provider race and the temperature lookup.
#[derive(Clone)]
pub struct TemperaturePipeline {
    resolver: RedundantResolver,
    weather: Arc<dyn TemperatureSource>,
}

impl TemperaturePipeline {
    pub fn new(resolver: RedundantResolver, weather: Arc<dyn TemperatureSource>) -> Self {
        Self { resolver, weather }
    }

    /// Run one request from raw input to a response.
    pub async fn run(&self, raw_cep: &str, span: &SpanScope) -> Result<TemperatureResponse, PipelineError> {
        enter(Stage::Received, span);

        let code = {
            let mut check = span.child("validate-zipcode");
            match PostalCode::parse(raw_cep) {
                Ok(code) => {
                    check.set_ok();
                    code
                }
                Err(e) => {
                    check.set_error(e.to_string());
                    return Err(PipelineError::MalformedInput);
                }
            }
        };
        enter(Stage::Validated, span);

        enter(Stage::Resolving, span);
        let location = {
            let mut lookup = span.child("resolve-location");
            match self.resolver.resolve(&code, &lookup).await {
                Ok(location) => {
                    lookup.set_ok();
                    location
                }
                Err(e) => {
                    lookup.set_error(e.to_string());
                    return Err(e.into());
                }
            }
        };
        let city = location
            .city_name()
            .ok_or(PipelineError::NoLocationFound)?
            .to_string();
        enter(Stage::Resolved, span);

        enter(Stage::Enriching, span);
        let reading = {
            let mut lookup = span.child("fetch-temperature");
            match self.weather.fetch_temperature(&city, lookup.context()).await {
                Ok(reading) => {
                    lookup.set_ok();
                    metrics::record_weather_lookup("ok");
                    reading
                }
                Err(e) => {
                    lookup.set_error(e.to_string());
                    metrics::record_weather_lookup("failed");
                    return Err(e.into());
                }
            }
        };

        enter(Stage::Responded, span);
        Ok(TemperatureResponse::new(reading.celsius, city))
    }
}

fn enter(stage: Stage, span: &SpanScope) {
    tracing::debug!(trace_id = %span.context().trace_id, stage = stage.as_str(), "Pipeline stage");
}
