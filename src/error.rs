//! Error types for the distributed cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for namespace lookups, peer fetches and startup wiring.
///
/// The type is `Clone` because a single in-flight load hands the very same
/// error to every caller that was waiting on it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// The request carried an unusable argument (e.g. an empty key)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The local loader could not produce a value; message is the loader's own
    #[error("{0}")]
    Loader(String),

    /// Transport, status or decode failure while fetching from a peer
    #[error("Peer fetch failed: {0}")]
    PeerFetch(String),

    /// Wiring mistake detected at startup (double registration and the like)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// No namespace registered under this name
    #[error("Namespace not found: {0}")]
    NamespaceNotFound(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            CacheError::NamespaceNotFound(_) => StatusCode::NOT_FOUND,
            CacheError::PeerFetch(_) => StatusCode::BAD_GATEWAY,
            CacheError::Loader(_) | CacheError::Configuration(_) | CacheError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
