//! API error type mapping failures onto HTTP responses
//!
//! Every error renders as `{"error": message}` with a status code. Memory
//! service errors that carry an upstream status can pass it through; all
//! other failures collapse to 500.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use memgate_ai::AiError;
use memgate_client::ClientError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Mirror an upstream status code, falling back to 500 when it is not
    /// a valid HTTP status.
    pub fn upstream(status: u16, message: impl Into<String>) -> Self {
        let status =
            StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::new(status, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        tracing::error!(error = %err, "memory service call failed");
        Self::internal(err.to_string())
    }
}

impl From<AiError> for ApiError {
    fn from(err: AiError) -> Self {
        tracing::error!(error = %err, "completion call failed");
        Self::internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_keeps_valid_status() {
        let err = ApiError::upstream(409, "conflict");
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.message, "conflict");
    }

    #[test]
    fn upstream_rejects_invalid_status() {
        let err = ApiError::upstream(42, "weird");
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn client_error_maps_to_internal() {
        let err: ApiError = ClientError::Api {
            status: 503,
            message: "down".to_string(),
        }
        .into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.message.contains("down"));
    }
}
