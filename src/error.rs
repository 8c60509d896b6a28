//! Error types for the record cache
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
/// Errors raised by the cache and the lookup engine.
///
/// Only `Config` ever reaches a caller (from construction). The others are
/// logged by the engine and swallowed.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Cache configuration rejected at construction time
    #[error("Invalid cache configuration: {0}")]
    Config(String),

    /// Key is empty or too long to be stored
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Encoded record exceeds the configured entry size limit
    #[error("Entry too large: {size} bytes (limit {limit})")]
    EntryTooLarge { size: usize, limit: usize },

    /// Record could not be serialized for storage
    #[error("Failed to encode record: {0}")]
    Encode(#[source] serde_json::Error),

    /// Cached bytes could not be deserialized into the record type
    #[error("Failed to decode cached record: {0}")]
    Decode(#[source] serde_json::Error),
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;

// == Repository Error Enum ==
/// Errors raised by the in-memory user repository.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// No record with the given primary key
    #[error("record not found: {0}")]
    NotFound(String),

    /// A record with the given primary key already exists
    #[error("record already exists: {0}")]
    Conflict(String),
}

// == API Error Enum ==
/// Error type returned by HTTP handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Resource already exists
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(_) => ApiError::NotFound(err.to_string()),
            RepositoryError::Conflict(_) => ApiError::Conflict(err.to_string()),
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            ApiError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
