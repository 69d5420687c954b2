//! Error types for venture-probe-client

use thiserror::Error;

/// Errors that can occur while issuing a request
#[derive(Error, Debug)]
pub enum ClientError {
    /// Base URL or endpoint path could not be joined into a URL
    #[error("Invalid URL '{0}': {1}")]
    InvalidUrl(String, String),

    /// HTTP client could not be constructed
    #[error("HTTP client setup failed: {0}")]
    Setup(String),

    /// Connection refused, reset, DNS failure, or timeout
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response body was not valid JSON
    #[error("Response is not valid JSON (status {status}): {reason}")]
    Parse {
        /// HTTP status of the offending response
        status: u16,
        /// Parser message
        reason: String,
    },

    /// Request body serialization failed
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            ClientError::Setup(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

impl ClientError {
    /// Whether a retry may produce a different outcome.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ClientError::Transport(_) | ClientError::Parse { .. })
    }
}
