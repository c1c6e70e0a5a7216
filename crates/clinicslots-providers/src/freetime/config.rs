//! Free-time provider configuration.

use std::time::Duration;

use url::Url;

use crate::error::{ProviderError, ProviderResult};

/// Path of the free-time endpoint, relative to the base URL.
pub const FREE_TIME_PATH: &str = "Scheduler/GetFreeTime";

/// Configuration for the free-time HTTP provider.
#[derive(Debug, Clone)]
pub struct FreeTimeConfig {
    /// Base URL of the scheduling provider API (e.g. `https://proxy.example.com/api`).
    pub base_url: String,

    /// Request timeout. A timed-out request counts as a provider failure.
    pub timeout: Duration,

    /// User agent string for API requests.
    pub user_agent: String,

    /// Name of the header that carries the auth token.
    pub auth_header: String,
}

impl FreeTimeConfig {
    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

    /// Default auth header name.
    pub const DEFAULT_AUTH_HEADER: &'static str = "DoctorOnlineProxyAuthToken";

    /// Creates a configuration for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: format!("clinicslots/{}", env!("CARGO_PKG_VERSION")),
            auth_header: Self::DEFAULT_AUTH_HEADER.to_string(),
        }
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets the auth header name.
    pub fn with_auth_header(mut self, header: impl Into<String>) -> Self {
        self.auth_header = header.into();
        self
    }

    /// Returns the full free-time endpoint URL.
    ///
    /// A trailing slash is added to the base so that a path prefix such as
    /// `/api` is kept when joining.
    pub fn endpoint(&self) -> ProviderResult<Url> {
        let base = format!("{}/", self.base_url.trim().trim_end_matches('/'));
        let base = Url::parse(&base).map_err(|e| {
            ProviderError::configuration(format!("invalid base URL '{}': {}", self.base_url, e))
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(ProviderError::configuration(format!(
                "base URL must be http or https, got '{}'",
                base.scheme()
            )));
        }
        base.join(FREE_TIME_PATH)
            .map_err(|e| ProviderError::configuration(format!("invalid endpoint: {}", e)))
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.trim().is_empty() {
            return Err("base_url is required".to_string());
        }
        if self.timeout.is_zero() {
            return Err("timeout must be greater than zero".to_string());
        }
        if self.auth_header.trim().is_empty() {
            return Err("auth_header must not be empty".to_string());
        }
        reqwest::header::HeaderName::from_bytes(self.auth_header.as_bytes())
            .map_err(|_| format!("auth_header '{}' is not a valid header name", self.auth_header))?;
        self.endpoint().map(|_| ()).map_err(|e| e.message().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = FreeTimeConfig::new("https://proxy.example.com");
        assert_eq!(config.timeout, Duration::from_secs(20));
        assert_eq!(config.auth_header, "DoctorOnlineProxyAuthToken");
        assert!(config.user_agent.starts_with("clinicslots/"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn endpoint_keeps_path_prefix() {
        let config = FreeTimeConfig::new("https://proxy.example.com/api");
        assert_eq!(
            config.endpoint().unwrap().as_str(),
            "https://proxy.example.com/api/Scheduler/GetFreeTime"
        );

        let config = FreeTimeConfig::new("https://proxy.example.com/api/");
        assert_eq!(
            config.endpoint().unwrap().as_str(),
            "https://proxy.example.com/api/Scheduler/GetFreeTime"
        );
    }

    #[test]
    fn rejects_bad_urls() {
        assert!(FreeTimeConfig::new("").validate().is_err());
        assert!(FreeTimeConfig::new("not a url").validate().is_err());
        assert!(FreeTimeConfig::new("ftp://proxy.example.com").validate().is_err());
    }

    #[test]
    fn rejects_bad_header_and_timeout() {
        let config = FreeTimeConfig::new("https://proxy.example.com").with_auth_header("bad header");
        assert!(config.validate().is_err());

        let config = FreeTimeConfig::new("https://proxy.example.com").with_timeout(Duration::ZERO);
        assert!(config.validate().is_err());
    }
}
