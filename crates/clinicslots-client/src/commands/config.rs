//! Configuration commands.

use std::path::Path;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Dump the current configuration to stdout.
///
/// Secret references are printed as written, never resolved.
pub fn dump(config: &ClientConfig, path: &Path) -> ClientResult<()> {
    let toml_str = toml::to_string_pretty(config)
        .map_err(|e| ClientError::Config(format!("failed to serialize config: {}", e)))?;
    println!("# config.toml ({})", path.display());
    println!("{}", toml_str);
    Ok(())
}

/// Validate the configuration, returning one line per check that passed.
pub fn validate(config: &ClientConfig) -> ClientResult<Vec<String>> {
    let mut report = Vec::new();

    config.service.validate().map_err(ClientError::Config)?;
    match config.service.provider.base_url.as_deref().map(str::trim) {
        Some(url) if !url.is_empty() => report.push(format!("provider: {}", url)),
        _ => report.push("provider: not configured, queries use the fixture fallback".into()),
    }

    let resolver = config
        .credentials
        .to_resolver()
        .map_err(|e| ClientError::Config(format!("invalid credentials: {}", e)))?;
    report.push(format!("token cipher: {}", resolver.cipher().mode()));

    if config.service.fixture.enabled {
        config
            .service
            .fixture
            .load()
            .map_err(|e| ClientError::Config(format!("invalid fixture: {}", e)))?;
        report.push("fixture: loaded".into());
    }

    report.push("Configuration is valid.".into());
    Ok(report)
}

/// Show the configuration file path.
pub fn path(path: &Path) -> ClientResult<()> {
    println!("config: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let report = validate(&ClientConfig::default()).unwrap();
        assert!(report[0].contains("fixture fallback"));
        assert_eq!(report.last().map(String::as_str), Some("Configuration is valid."));
    }

    #[test]
    fn reports_provider_url() {
        let mut config = ClientConfig::default();
        config.service = config.service.with_base_url("https://proxy.example.com");
        let report = validate(&config).unwrap();
        assert_eq!(report[0], "provider: https://proxy.example.com");
    }

    #[test]
    fn rejects_invalid_service_settings() {
        let mut config = ClientConfig::default();
        config.service.default_range_days = 0;
        assert!(matches!(validate(&config), Err(ClientError::Config(_))));
    }

    #[test]
    fn rejects_missing_fixture_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ClientConfig::default();
        config.service.fixture.slots_path = Some(dir.path().join("slots.json"));
        config.service.fixture.schedulers_path = Some(dir.path().join("schedulers.json"));

        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("invalid fixture"));
    }
}
