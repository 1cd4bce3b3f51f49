//! Error types for media queries.

use thiserror::Error;

/// Errors surfaced by the media list source and the aggregators
#[derive(Debug, Error)]
pub enum MediaError {
    /// Malformed query parameters, rejected before any network call
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    /// The owning run was superseded or cancelled
    #[error("Run cancelled")]
    Cancelled,
}

impl MediaError {
    pub fn invalid(message: impl Into<String>) -> Self {
        MediaError::InvalidRequest(message.into())
    }

    pub fn is_invalid_request(&self) -> bool {
        matches!(self, MediaError::InvalidRequest(_))
    }
}

/// Transport, timeout and decoding failures of a single query
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Request timed out")]
    Timeout,

    #[error("HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("GraphQL errors: {}", .0.join(", "))]
    GraphQl(Vec<String>),

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl NetworkError {
    /// Whether retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            NetworkError::Request(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            NetworkError::Timeout => true,
            NetworkError::Status { status, .. } => *status == 429 || *status >= 500,
            NetworkError::GraphQl(_) | NetworkError::Decode(_) => false,
        }
    }
}
