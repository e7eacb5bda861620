//! Request identification and body decoding.
//!
//! # Responsibilities
//! - Generate a request ID (UUID v4) when the caller sent none
//! - Decode the `{"cep": "..."}` body shared by both hops
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - The body is decoded by hand so a bad body maps to our own 400 body
//!   instead of axum's rejection text

use axum::body::Bytes;
use axum::http::{HeaderMap, HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::http::response::ApiError;
use crate::pipeline::CepRequest;

/// Header carrying the request ID between client, edge and resolver.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates a fresh UUID v4 for requests arriving without an ID.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// The request ID of an inbound request, or `"-"` when absent.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
}

/// Decode the JSON request body.
pub fn decode_body(body: &Bytes) -> Result<CepRequest, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "Rejecting undecodable request body");
        ApiError::MalformedBody
    })
}
