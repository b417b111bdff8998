//! Server error types and their HTTP mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Errors surfaced by the annotation store API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Key contains characters outside the fingerprint alphabet.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Filesystem operation failed.
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// A stored drawing file no longer parses as JSON.
    #[error("corrupt stored record: {0}")]
    Corrupt(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidKey(_) => StatusCode::BAD_REQUEST,
            ApiError::Storage(_) | ApiError::Corrupt(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_key_maps_to_bad_request() {
        let response = ApiError::InvalidKey("../etc".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_storage_maps_to_internal_error() {
        let err = ApiError::Storage(std::io::Error::other("disk gone"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
