//! Handler of the edge hop: validate locally, then forward.

use std::time::{Duration, Instant};

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode, Uri};
use axum::http::Response as HttpResponse;
use axum::response::{IntoResponse, Response};
use hyper::body::Incoming;
use hyper_util::client::legacy::{connect::HttpConnector, Client};

use crate::cep;
use crate::http::request::{decode_body, request_id, X_REQUEST_ID};
use crate::http::response::ApiError;
use crate::observability::{metrics, trace, SpanScope, Tracer};
use crate::pipeline::CepRequest;

/// State shared by edge handlers.
#[derive(Clone)]
pub struct EdgeState {
    pub client: Client<HttpConnector, Body>,
    pub resolver_uri: Uri,
    pub tracer: Tracer,
    pub forward_timeout: Duration,
    pub max_body_bytes: usize,
}

/// `POST /`: reject bad codes, relay everything else to the resolution hop.
pub async fn forward_handler(
    State(state): State<EdgeState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let start = Instant::now();
    let parent = state.tracer.extract(&headers);
    let mut span = state.tracer.start_span("edge-request", parent.as_ref());
    let request_id = request_id(&headers).to_string();

    let response = match handle(&state, &request_id, &body, &span).await {
        Ok(response) => {
            span.set_ok();
            response
        }
        Err(e) => {
            span.set_error(e.to_string());
            e.into_response()
        }
    };

    metrics::record_request("edge", response.status().as_u16(), start);
    response
}

async fn handle(
    state: &EdgeState,
    request_id: &str,
    body: &Bytes,
    span: &SpanScope,
) -> Result<Response, ApiError> {
    let request = decode_body(body)?;
    if !cep::validate(&request.cep) {
        tracing::debug!(request_id = %request_id, "Rejecting invalid zipcode at the edge");
        return Err(ApiError::InvalidZipcode);
    }

    let mut forward = span.child("forward-to-resolver");
    match forward_request(state, request_id, &request, &forward).await {
        Ok(response) => {
            forward.set_ok();
            Ok(response)
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Resolution hop unavailable");
            forward.set_error(e.to_string());
            Err(e)
        }
    }
}

/// Forward to the resolution hop and relay its status and body verbatim.
async fn forward_request(
    state: &EdgeState,
    request_id: &str,
    request: &CepRequest,
    span: &SpanScope,
) -> Result<Response, ApiError> {
    let payload = serde_json::to_vec(request)
        .map_err(|e| ApiError::Transport(format!("failed to encode request: {e}")))?;

    let mut upstream = Request::builder()
        .method(Method::POST)
        .uri(state.resolver_uri.clone())
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload))
        .map_err(|e| ApiError::Transport(format!("failed to build request: {e}")))?;

    let headers = upstream.headers_mut();
    trace::inject(span.context(), headers);
    if let Ok(value) = HeaderValue::from_str(request_id) {
        headers.insert(X_REQUEST_ID, value);
    }

    let response: HttpResponse<Incoming> = tokio::time::timeout(state.forward_timeout, state.client.request(upstream))
        .await
        .map_err(|_| ApiError::Transport("resolution service timed out".to_string()))?
        .map_err(|e| ApiError::Transport(format!("failed to reach resolution service: {e}")))?;

    let (parts, body) = response.into_parts();
    let bytes = axum::body::to_bytes(Body::new(body), state.max_body_bytes)
        .await
        .map_err(|e| ApiError::Transport(format!("failed to read resolution service response: {e}")))?;

    if serde_json::from_slice::<serde_json::Value>(&bytes).is_err() {
        return Err(ApiError::Transport(
            "invalid response from resolution service".to_string(),
        ));
    }

    tracing::debug!(
        request_id = %request_id,
        status = %parts.status,
        "Relaying resolution service response"
    );
    Ok(relay(parts.status, bytes))
}

fn relay(status: StatusCode, body: Bytes) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
        body,
    )
        .into_response()
}
