//! Handler of the resolution hop.

use std::time::Instant;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::http::request::{decode_body, request_id};
use crate::http::response::ApiError;
use crate::observability::{metrics, Tracer};
use crate::pipeline::TemperaturePipeline;

/// State shared by resolution hop handlers.
#[derive(Clone)]
pub struct ResolverState {
    pub pipeline: TemperaturePipeline,
    pub tracer: Tracer,
}

/// `POST /`: validate, resolve and enrich one postal code.
pub async fn resolve_handler(
    State(state): State<ResolverState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let start = Instant::now();
    let parent = state.tracer.extract(&headers);
    let mut span = state.tracer.start_span("resolve-temperature", parent.as_ref());

    tracing::debug!(
        request_id = %request_id(&headers),
        trace_id = %span.context().trace_id,
        "Resolving temperature"
    );

    let result = match decode_body(&body) {
        Ok(request) => state
            .pipeline
            .run(&request.cep, &span)
            .await
            .map_err(|e| {
                tracing::info!(
                    request_id = %request_id(&headers),
                    stage = %e.stage(),
                    error = %e,
                    "Request failed"
                );
                ApiError::from(e)
            }),
        Err(e) => Err(e),
    };

    let response = match result {
        Ok(temperature) => {
            span.set_ok();
            (StatusCode::OK, Json(temperature)).into_response()
        }
        Err(e) => {
            span.set_error(e.to_string());
            e.into_response()
        }
    };

    metrics::record_request("resolver", response.status().as_u16(), start);
    response
}
