//! Error taxonomy for harness setup.
//!
//! Failures of the remote service never surface here; they become test
//! outcomes. These errors cover configuration, corpus loading and I/O.

use venture_probe_client::ClientError;

/// Harness errors.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("unknown endpoint: {0}")]
    UnknownEndpoint(String),

    #[error("invalid corpus: {0}")]
    Corpus(String),

    #[error("client error: {0}")]
    Client(#[from] ClientError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for harness operations.
pub type Result<T> = std::result::Result<T, HarnessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_harness_error_display() {
        let err = HarnessError::InvalidConfig("pass threshold above 100".to_string());
        assert!(err.to_string().contains("invalid configuration"));

        let err = HarnessError::UnknownEndpoint("pricing".to_string());
        assert_eq!(err.to_string(), "unknown endpoint: pricing");
    }

    #[test]
    fn test_from_serde_error() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: HarnessError = parse_err.into();
        assert!(matches!(err, HarnessError::Serialization(_)));
    }
}
