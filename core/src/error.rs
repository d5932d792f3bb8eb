//! Error types for the core library

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    #[error("Team not found: {0}")]
    TeamNotFound(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid JSON in {field}: {message}")]
    InvalidConfig { field: String, message: String },

    #[error("Storage error: {0}")]
    Storage(String),
}

impl Error {
    /// Build an `InvalidConfig` error from a JSON parse failure
    pub fn invalid_config(field: impl Into<String>, err: &serde_json::Error) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            message: err.to_string(),
        }
    }

    /// Whether the error means a referenced record does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::AgentNotFound(_) | Self::TeamNotFound(_) | Self::NotFound(_)
        )
    }

    /// Whether the error was caused by caller-supplied data
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::InvalidConfig { .. })
    }
}

/// Trim a required name, rejecting blank input
pub(crate) fn require_name(name: &str, what: &str) -> Result<String, Error> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput(format!("{} cannot be empty", what)));
    }
    Ok(trimmed.to_string())
}
