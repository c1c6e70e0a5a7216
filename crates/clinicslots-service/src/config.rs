//! Service configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use clinicslots_core::DisplayZone;
use clinicslots_providers::fixture::FixtureDataset;
use clinicslots_providers::{DEFAULT_DURATION_MINUTES, FixtureError, FreeTimeConfig};

/// Availability service configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Zone used to derive slot dates and times.
    pub timezone: DisplayZone,

    /// Appointment length used when a query gives none (or zero).
    pub default_duration_minutes: u32,

    /// Length of the default query window, starting now.
    pub default_range_days: i64,

    /// How long live provider responses are reused; zero disables caching.
    pub cache_ttl_secs: u64,

    /// Scheduling provider settings.
    pub provider: ProviderSettings,

    /// Fallback fixture settings.
    pub fixture: FixtureSettings,

    /// JSON scheduler list backing the static content store.
    pub content_path: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            timezone: DisplayZone::default(),
            default_duration_minutes: DEFAULT_DURATION_MINUTES,
            default_range_days: 30,
            cache_ttl_secs: 60,
            provider: ProviderSettings::default(),
            fixture: FixtureSettings::default(),
            content_path: None,
        }
    }
}

impl ServiceConfig {
    /// Longest default query window.
    pub const MAX_RANGE_DAYS: i64 = 366;

    /// Builder: set display zone.
    pub fn with_timezone(mut self, timezone: DisplayZone) -> Self {
        self.timezone = timezone;
        self
    }

    /// Builder: set default duration.
    pub fn with_default_duration(mut self, minutes: u32) -> Self {
        self.default_duration_minutes = minutes;
        self
    }

    /// Builder: set cache TTL.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl_secs = ttl.as_secs();
        self
    }

    /// Builder: enable or disable the fixture fallback.
    pub fn with_fixture_enabled(mut self, enabled: bool) -> Self {
        self.fixture.enabled = enabled;
        self
    }

    /// Builder: set provider base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.provider.base_url = Some(base_url.into());
        self
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Checks values that would otherwise silently misbehave.
    pub fn validate(&self) -> Result<(), String> {
        if self.default_duration_minutes == 0 {
            return Err("default_duration_minutes must be greater than zero".to_string());
        }
        if !(1..=Self::MAX_RANGE_DAYS).contains(&self.default_range_days) {
            return Err(format!(
                "default_range_days must be between 1 and {}",
                Self::MAX_RANGE_DAYS
            ));
        }
        if let Some(config) = self.provider.to_freetime_config() {
            config.validate().map_err(|e| format!("provider: {}", e))?;
        }
        self.fixture.validate()
    }
}

/// Scheduling provider settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Base URL of the provider API. Without it every query takes the
    /// fallback path.
    pub base_url: Option<String>,

    /// Request timeout in seconds.
    pub timeout: u64,

    /// Header carrying the auth token.
    pub auth_header: String,

    /// User agent override.
    pub user_agent: Option<String>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: FreeTimeConfig::DEFAULT_TIMEOUT_SECS,
            auth_header: FreeTimeConfig::DEFAULT_AUTH_HEADER.to_string(),
            user_agent: None,
        }
    }
}

impl ProviderSettings {
    /// Converts to provider configuration, or `None` when no base URL is set.
    pub fn to_freetime_config(&self) -> Option<FreeTimeConfig> {
        let base_url = self.base_url.as_deref().map(str::trim).filter(|u| !u.is_empty())?;
        let mut config = FreeTimeConfig::new(base_url)
            .with_timeout(Duration::from_secs(self.timeout))
            .with_auth_header(&self.auth_header);
        if let Some(ua) = &self.user_agent {
            config = config.with_user_agent(ua);
        }
        Some(config)
    }
}

/// Fallback fixture settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureSettings {
    /// Serve fixture slots when the provider fails.
    pub enabled: bool,

    /// Also fall back when the provider succeeds with no slots.
    pub on_empty: bool,

    /// Replacement slot file (`{ "result": [...] }`).
    pub slots_path: Option<PathBuf>,

    /// Replacement scheduler metadata file.
    pub schedulers_path: Option<PathBuf>,
}

impl Default for FixtureSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            on_empty: true,
            slots_path: None,
            schedulers_path: None,
        }
    }
}

impl FixtureSettings {
    /// Both paths or neither.
    pub fn validate(&self) -> Result<(), String> {
        match (&self.slots_path, &self.schedulers_path) {
            (Some(_), None) | (None, Some(_)) => Err(
                "fixture.slots_path and fixture.schedulers_path must be set together".to_string(),
            ),
            _ => Ok(()),
        }
    }

    /// Loads the configured dataset, or `None` when the fallback is disabled.
    pub fn load(&self) -> Result<Option<FixtureDataset>, FixtureError> {
        if !self.enabled {
            return Ok(None);
        }
        let dataset = match (&self.slots_path, &self.schedulers_path) {
            (Some(slots), Some(schedulers)) => FixtureDataset::load(slots, schedulers)?,
            _ => FixtureDataset::bundled()?,
        };
        Ok(Some(dataset))
    }
}
