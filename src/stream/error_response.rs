//! Error responses for requests that cannot be streamed
//!
//! Errors contained to a single request are reported to the client as a
//! small JSON document with a stable code, alongside the CORS headers every
//! response on the stream path carries.

use crate::stream::headers;
use crate::stream::types::StreamError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Standard error response format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Unique error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Convert to HTTP response with CORS headers
    pub fn into_response_with_status(self, status: StatusCode) -> Response {
        let mut response = (status, Json(self)).into_response();
        headers::apply_cors(response.headers_mut());
        response
    }
}

/// Extension trait for consistent error formatting
pub trait ErrorResponseExt {
    /// Convert to standardized error response
    fn to_error_response(&self) -> ErrorResponse;

    /// Get the appropriate HTTP status code
    fn status_code(&self) -> StatusCode;
}

impl ErrorResponseExt for StreamError {
    fn to_error_response(&self) -> ErrorResponse {
        match self {
            StreamError::StreamingUnsupported { .. } => {
                ErrorResponse::new("STREAMING_UNSUPPORTED", "Streaming not supported")
            }
            StreamError::EventEncode { .. } => {
                ErrorResponse::new("EVENT_ENCODE_ERROR", self.to_string())
            }
        }
    }

    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for StreamError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        self.to_error_response().into_response_with_status(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_streaming_unsupported_response() {
        let response = StreamError::StreamingUnsupported {
            version: http::Version::HTTP_09,
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()[headers::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(
            response.headers()[headers::CONTENT_TYPE],
            headers::content_types::JSON
        );

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            error,
            ErrorResponse::new("STREAMING_UNSUPPORTED", "Streaming not supported")
        );
    }
}
