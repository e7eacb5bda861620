//! Error responses and their status mapping.
//!
//! Every failure leaves a hop as `{"error": "<message>"}`. Internal detail
//! never crosses the boundary, except the edge's transport message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::pipeline::{ErrorBody, PipelineError};

/// Errors a handler can answer with.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request body")]
    MalformedBody,

    #[error("invalid zipcode")]
    InvalidZipcode,

    #[error("can not find zipcode")]
    ZipcodeNotFound,

    #[error("failed to get temperature")]
    TemperatureUnavailable,

    /// The edge could not get a usable answer from the resolution hop.
    #[error("{0}")]
    Transport(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MalformedBody => StatusCode::BAD_REQUEST,
            ApiError::InvalidZipcode => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::ZipcodeNotFound => StatusCode::NOT_FOUND,
            ApiError::TemperatureUnavailable | ApiError::Transport(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::MalformedInput => ApiError::InvalidZipcode,
            // Timeouts are kept apart in logs and metrics, merged here.
            PipelineError::NoLocationFound | PipelineError::ResolutionTimeout => {
                ApiError::ZipcodeNotFound
            }
            PipelineError::EnrichmentFailure(_) => ApiError::TemperatureUnavailable,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(ErrorBody::new(self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::WeatherError;

    async fn body_of(err: ApiError) -> (StatusCode, String) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_status_and_body_mapping() {
        assert_eq!(
            body_of(ApiError::InvalidZipcode).await,
            (StatusCode::UNPROCESSABLE_ENTITY, r#"{"error":"invalid zipcode"}"#.to_string())
        );
        assert_eq!(
            body_of(ApiError::ZipcodeNotFound).await,
            (StatusCode::NOT_FOUND, r#"{"error":"can not find zipcode"}"#.to_string())
        );
        assert_eq!(
            body_of(ApiError::TemperatureUnavailable).await,
            (StatusCode::INTERNAL_SERVER_ERROR, r#"{"error":"failed to get temperature"}"#.to_string())
        );
        assert_eq!(
            body_of(ApiError::MalformedBody).await,
            (StatusCode::BAD_REQUEST, r#"{"error":"invalid request body"}"#.to_string())
        );
    }

    #[test]
    fn test_timeout_and_not_found_merge_at_the_boundary() {
        assert!(matches!(ApiError::from(PipelineError::ResolutionTimeout), ApiError::ZipcodeNotFound));
        assert!(matches!(ApiError::from(PipelineError::NoLocationFound), ApiError::ZipcodeNotFound));
        assert!(matches!(
            ApiError::from(PipelineError::EnrichmentFailure(WeatherError::Status(500))),
            ApiError::TemperatureUnavailable
        ));
    }
}
