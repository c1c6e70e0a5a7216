//! Error types for scheduling provider operations.
//!
//! Every failure talking to the provider surfaces as a [`ProviderError`]. The
//! availability service never shows these to end users: any provider error
//! sends it down the fixture fallback path.

use std::fmt;
use thiserror::Error;

/// The category of a provider error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderErrorCode {
    /// The provider rejected the auth token (401).
    AuthenticationFailed,
    /// The token is valid but may not read this scheduler (403).
    AuthorizationFailed,
    /// Connection failed, DNS resolution failed, or the body could not be read.
    NetworkError,
    /// The request exceeded its timeout.
    Timeout,
    /// Too many requests (429).
    RateLimited,
    /// Server returned an error (5xx or any other non-200 status).
    ServerError,
    /// The body was not the expected JSON envelope.
    InvalidResponse,
    /// The envelope parsed but carried no `result` array.
    MissingResult,
    /// The request could not be built (bad base URL, no scheduler ids).
    BadRequest,
    /// Missing or invalid configuration.
    ConfigurationError,
}

impl ProviderErrorCode {
    /// Returns a stable snake_case name for this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthenticationFailed => "authentication_failed",
            Self::AuthorizationFailed => "authorization_failed",
            Self::NetworkError => "network_error",
            Self::Timeout => "timeout",
            Self::RateLimited => "rate_limited",
            Self::ServerError => "server_error",
            Self::InvalidResponse => "invalid_response",
            Self::MissingResult => "missing_result",
            Self::BadRequest => "bad_request",
            Self::ConfigurationError => "configuration_error",
        }
    }
}

impl fmt::Display for ProviderErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error that occurred while talking to a scheduling provider.
#[derive(Debug, Error)]
pub struct ProviderError {
    code: ProviderErrorCode,
    message: String,
    /// The provider that generated this error (e.g., "freetime").
    provider: Option<String>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ProviderError {
    /// Creates a new provider error with the given code and message.
    pub fn new(code: ProviderErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider: None,
            source: None,
        }
    }

    /// Creates an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::AuthenticationFailed, message)
    }

    /// Creates an authorization error.
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::AuthorizationFailed, message)
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::NetworkError, message)
    }

    /// Creates a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::Timeout, message)
    }

    /// Creates a rate limit error.
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::RateLimited, message)
    }

    /// Creates a server error.
    pub fn server(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::ServerError, message)
    }

    /// Creates an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::InvalidResponse, message)
    }

    /// Creates a missing-result error.
    pub fn missing_result(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::MissingResult, message)
    }

    /// Creates a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::BadRequest, message)
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::ConfigurationError, message)
    }

    /// Sets the provider name for this error.
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Sets the source error for this error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error code.
    pub fn code(&self) -> ProviderErrorCode {
        self.code
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the provider name, if set.
    pub fn provider(&self) -> Option<&str> {
        self.provider.as_deref()
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref provider) = self.provider {
            write!(f, "[{}] ", provider)?;
        }
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        let base = if err.is_timeout() {
            Self::timeout("request timed out")
        } else if err.is_connect() {
            Self::network(format!("connection failed: {}", err))
        } else if err.is_decode() {
            Self::invalid_response(format!("failed to decode response: {}", err))
        } else {
            Self::network(format!("request failed: {}", err))
        };
        base.with_source(err)
    }
}

/// A specialized Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_display() {
        assert_eq!(ProviderErrorCode::MissingResult.as_str(), "missing_result");
        assert_eq!(ProviderErrorCode::Timeout.to_string(), "timeout");
    }

    #[test]
    fn provider_error_with_provider() {
        let err = ProviderError::network("connection refused").with_provider("freetime");
        assert_eq!(err.code(), ProviderErrorCode::NetworkError);
        assert_eq!(err.provider(), Some("freetime"));
        assert_eq!(err.message(), "connection refused");
    }

    #[test]
    fn provider_error_display() {
        let err = ProviderError::missing_result("no result array").with_provider("freetime");
        let display = err.to_string();
        assert!(display.contains("[freetime]"));
        assert!(display.contains("missing_result"));
        assert!(display.contains("no result array"));
    }

    #[test]
    fn provider_error_with_source() {
        use std::error::Error;
        let io_err = std::io::Error::other("socket closed");
        let err = ProviderError::network("read failed").with_source(io_err);
        assert!(err.source().is_some());
    }
}
