//! API error responses

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Error raised by the adapter
    #[error(transparent)]
    Adapter(#[from] deploy_adapter::Error),

    /// Operation the adapter does not support
    #[error("Not implemented: {0}")]
    NotImplemented(String),
}

/// JSON error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error kind
    pub error: String,
    /// Human-readable message
    pub message: String,
}

/// Map a numeric code to a standard status, falling back to 500 for codes
/// without a canonical reason phrase
pub fn sanitize_status_code(code: u16) -> StatusCode {
    StatusCode::from_u16(code)
        .ok()
        .filter(|status| status.canonical_reason().is_some())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (code, error_type, message) = match &self {
            ApiError::Adapter(err) => (err.status_code(), err.kind().as_str(), err.message().to_string()),
            ApiError::NotImplemented(msg) => (501, "not_implemented", msg.clone()),
        };
        let status = sanitize_status_code(code);

        if status.is_server_error() {
            tracing::warn!("Request failed ({}): {}", status, message);
        }

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Adapter(err.into())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use deploy_adapter::Error;

    #[test]
    fn test_sanitize_status_code() {
        assert_eq!(sanitize_status_code(404), StatusCode::NOT_FOUND);
        assert_eq!(sanitize_status_code(409), StatusCode::CONFLICT);
        assert_eq!(sanitize_status_code(599), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(sanitize_status_code(42), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(sanitize_status_code(0), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_adapter_errors_map_to_status() {
        let cases = [
            (Error::NotFound("x".into()), StatusCode::NOT_FOUND),
            (Error::Conflict("x".into()), StatusCode::CONFLICT),
            (Error::Validation("x".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (Error::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            let response = ApiError::from(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }

    #[test]
    fn test_not_implemented_is_501() {
        let response = ApiError::NotImplemented("updates".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
    }
}
