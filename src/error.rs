//! Error types for the content cache
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
/// Unified error type for the content cache.
///
/// A cache miss is never an error; these variants only describe failures
/// to write, malformed input, or bad maintenance requests.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Underlying storage read/write failed
    #[error("Storage error: {0}")]
    Io(#[from] std::io::Error),

    /// Value could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Blocking storage work did not complete
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// Key is empty or otherwise unusable
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Entity type has no invalidation rule
    #[error("Unknown entity type: {0}")]
    UnknownEntity(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::Io(_) | CacheError::Serialization(_) | CacheError::Task(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            CacheError::InvalidKey(_)
            | CacheError::InvalidRequest(_)
            | CacheError::UnknownEntity(_) => StatusCode::BAD_REQUEST,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the content cache.
pub type Result<T> = std::result::Result<T, CacheError>;
