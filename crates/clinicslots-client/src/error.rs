//! Client error types.

use thiserror::Error;

use clinicslots_providers::CredentialError;
use clinicslots_service::{ServiceError, StoreError};

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Invalid command-line input.
    #[error("invalid input: {0}")]
    Input(String),

    /// Token encryption or decryption failed.
    #[error("credential error: {0}")]
    Credential(#[from] CredentialError),

    /// Content store could not be loaded.
    #[error("content store error: {0}")]
    Store(#[from] StoreError),

    /// Service setup failed.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Output could not be serialized.
    #[error("failed to serialize output: {0}")]
    Output(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            ClientError::Config("missing salt".into()).to_string(),
            "configuration error: missing salt"
        );
        assert_eq!(
            ClientError::Input("bad date".into()).to_string(),
            "invalid input: bad date"
        );
        let err: ClientError = ServiceError::config("default_range_days must be greater than zero").into();
        assert!(err.to_string().contains("default_range_days"));
    }
}
