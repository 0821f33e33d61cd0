//! Moodring error types

use std::time::Duration;

/// Moodring error types
#[derive(Debug, thiserror::Error)]
pub enum MoodringError {
    // Client input errors
    #[error("invalid input: {0}")]
    InvalidInput(String),

    // Availability errors
    /// The inference backend never loaded; terminal for the process lifetime.
    #[error("sentiment analysis model is not loaded")]
    ModelUnavailable,

    #[error("inference failed: {0}")]
    Inference(String),

    // Provider/network errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("model not found: {0}")]
    ModelNotFound(String),

    #[error("empty response from model")]
    EmptyResponse,

    // Cache errors, swallowed at the point of use
    #[error("cache error: {0}")]
    Cache(String),

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl MoodringError {
    /// Whether a retry of the same provider call may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            MoodringError::Http(_)
            | MoodringError::RateLimited { .. }
            | MoodringError::EmptyResponse => true,
            MoodringError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Provider-supplied backoff hint, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            MoodringError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

impl From<redis::RedisError> for MoodringError {
    fn from(err: redis::RedisError) -> Self {
        MoodringError::Cache(err.to_string())
    }
}

/// Result type alias for Moodring operations
pub type Result<T> = std::result::Result<T, MoodringError>;
