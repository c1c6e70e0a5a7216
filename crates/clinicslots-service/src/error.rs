//! Service error types.

use std::io;
use thiserror::Error;

use clinicslots_providers::{FixtureError, ProviderError};

/// Result type for content store lookups.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for service setup.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors from a content store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached.
    #[error("content store unavailable: {message}")]
    Unavailable { message: String },

    /// IO error reading a store file.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Store data could not be parsed.
    #[error("invalid store data: {0}")]
    Parse(#[from] FixtureError),
}

impl StoreError {
    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

/// Errors building the availability service.
///
/// Queries themselves never fail; these only arise from setup.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The provider could not be constructed.
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The fixture dataset could not be loaded.
    #[error("Fixture error: {0}")]
    Fixture(#[from] FixtureError),

    /// The content store could not be loaded.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl ServiceError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
