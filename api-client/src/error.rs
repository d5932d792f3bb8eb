//! Error types for the API client

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors returned by [`crate::ApiService`]
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("Request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body did not match the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),

    /// The configured base URL is unusable
    #[error("Invalid base URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// Local storage failure
    #[error(transparent)]
    Core(#[from] inventu_core::Error),
}

impl ApiError {
    /// Whether the server rejected the request's credentials
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status: 401, .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}
