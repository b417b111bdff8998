//! Remote store client error types.

use std::sync::Arc;

/// Errors from the remote annotation store client.
///
/// The taxonomy mirrors the failure classes the caller has to reason about:
/// transport (unreachable, timeout), protocol (non-conforming response),
/// and serialization (malformed JSON on either side).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Network-level failure reaching the store.
    #[error("transport error: {0}")]
    Transport(Arc<reqwest::Error>),

    /// Request timed out at the HTTP layer.
    #[error("request timeout")]
    Timeout,

    /// HTTP error status from the store.
    #[error("HTTP error: {status}")]
    Http { status: u16 },

    /// Response body did not conform to the store protocol.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Malformed JSON in a request or response body.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The configured endpoint is not a usable URL.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            StoreError::Timeout
        } else if err.is_decode() {
            StoreError::Serialization(err.to_string())
        } else {
            StoreError::Transport(Arc::new(err))
        }
    }
}
