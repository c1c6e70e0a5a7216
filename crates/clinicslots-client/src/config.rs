//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/clinicslots/config.toml` by default.
//!
//! Values in `[credentials]` support secret references:
//! - `pass::path/in/store` resolved via `pass show`
//! - `env::VAR_NAME` resolved from the environment
//! - plain text used as-is

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use clinicslots_providers::{CredentialResolver, CredentialSources, TokenCipher};
use clinicslots_service::ServiceConfig;

use crate::secret;

/// Configuration for the clinicslots client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Debug mode.
    pub debug: bool,

    /// Availability service settings.
    pub service: ServiceConfig,

    /// Provider token settings.
    pub credentials: CredentialSettings,
}

impl ClientConfig {
    /// Loads configuration from the default path, or defaults if it is absent.
    pub fn load() -> Result<Self, String> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content =
            std::fs::read_to_string(path).map_err(|e| format!("failed to read config: {}", e))?;
        toml::from_str(&content).map_err(|e| format!("failed to parse config: {}", e))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("clinicslots")
    }
}

/// Provider token settings.
///
/// The install salt and site id key the cipher for `encrypted_token`. Every
/// field accepts `pass::` and `env::` references.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialSettings {
    /// Per-installation secret salt.
    pub install_salt: Option<String>,

    /// Site identifier mixed into the key.
    pub site_id: Option<String>,

    /// Store tokens base64-encoded only, without encryption.
    pub obfuscate_only: bool,

    /// Operator-set token, highest priority.
    pub override_token: Option<String>,

    /// Token under the legacy setting name.
    pub legacy_token: Option<String>,

    /// Encrypted stored token (`clinicslots token encrypt` output).
    pub encrypted_token: Option<String>,

    /// Plaintext stored token.
    pub plaintext_token: Option<String>,

    /// Value marking `override_token` as not really set.
    pub placeholder: Option<String>,
}

impl CredentialSettings {
    /// Builds the token cipher from the salt and site id.
    pub fn cipher(&self) -> Result<TokenCipher, String> {
        if self.obfuscate_only {
            return Ok(TokenCipher::obfuscating());
        }

        let salt = secret::resolve_field("install_salt", self.install_salt.as_deref())?;
        let site = secret::resolve_field("site_id", self.site_id.as_deref())?;
        match (salt, site) {
            (Some(salt), Some(site)) => Ok(TokenCipher::new(&salt, &site)),
            _ => Err(format!(
                "token encryption needs install_salt and site_id. Add to {}:\n  \
                 [credentials]\n  \
                 install_salt = \"env::CLINICSLOTS_SALT\"\n  \
                 site_id = \"clinic.example.com\"",
                ClientConfig::default_path().display()
            )),
        }
    }

    /// Resolves every token source.
    pub fn sources(&self) -> Result<CredentialSources, String> {
        Ok(CredentialSources {
            override_token: secret::resolve_field("override_token", self.override_token.as_deref())?,
            legacy_token: secret::resolve_field("legacy_token", self.legacy_token.as_deref())?,
            encrypted_token: secret::resolve_field(
                "encrypted_token",
                self.encrypted_token.as_deref(),
            )?,
            plaintext_token: secret::resolve_field(
                "plaintext_token",
                self.plaintext_token.as_deref(),
            )?,
            placeholder: secret::resolve_field("placeholder", self.placeholder.as_deref())?,
        })
    }

    /// Builds the token resolution chain.
    ///
    /// The cipher is only required when an encrypted token is configured.
    pub fn to_resolver(&self) -> Result<CredentialResolver, String> {
        let sources = self.sources()?;
        let cipher = match self.cipher() {
            Ok(cipher) => cipher,
            Err(e) if sources.encrypted_token.is_some() => return Err(e),
            // Unused without an encrypted token.
            Err(_) => TokenCipher::new("", ""),
        };
        Ok(CredentialResolver::new(sources, cipher))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinicslots_core::DisplayZone;
    use clinicslots_providers::TokenSource;

    fn keyed() -> CredentialSettings {
        CredentialSettings {
            install_salt: Some("salt".to_string()),
            site_id: Some("site".to_string()),
            ..Default::default()
        }
    }

    mod loading {
        use super::*;

        #[test]
        fn empty_file_is_default() {
            let config: ClientConfig = toml::from_str("").unwrap();
            assert!(!config.debug);
            assert_eq!(config.service, ServiceConfig::default());
            assert_eq!(config.credentials, CredentialSettings::default());
        }

        #[test]
        fn full_file() {
            let config: ClientConfig = toml::from_str(
                r#"
debug = true

[service]
timezone = "Asia/Jerusalem"
default_duration_minutes = 45
cache_ttl_secs = 0

[service.provider]
base_url = "https://proxy.example.com/api"
timeout = 10

[service.fixture]
on_empty = false

[credentials]
install_salt = "salt"
site_id = "clinic.example.com"
override_token = "tok"
placeholder = "YOUR_TOKEN_HERE"
"#,
            )
            .unwrap();

            assert!(config.debug);
            assert_eq!(config.service.timezone.name(), "Asia/Jerusalem");
            assert_eq!(config.service.default_duration_minutes, 45);
            assert!(config.service.cache_ttl().is_zero());
            assert_eq!(config.service.provider.timeout, 10);
            assert!(config.service.fixture.enabled);
            assert!(!config.service.fixture.on_empty);
            assert_eq!(config.credentials.override_token.as_deref(), Some("tok"));
        }

        #[test]
        fn load_from_file() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("config.toml");
            std::fs::write(&path, "[service]\ntimezone = \"UTC\"\n").unwrap();

            let config = ClientConfig::load_from(&path).unwrap();
            assert_eq!(config.service.timezone, DisplayZone::Utc);
        }

        #[test]
        fn load_from_missing_file_errors() {
            let dir = tempfile::tempdir().unwrap();
            let err = ClientConfig::load_from(&dir.path().join("nope.toml")).unwrap_err();
            assert!(err.contains("failed to read config"));
        }

        #[test]
        fn load_from_invalid_toml_errors() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("config.toml");
            std::fs::write(&path, "[service\n").unwrap();
            let err = ClientConfig::load_from(&path).unwrap_err();
            assert!(err.contains("failed to parse config"));
        }

        #[test]
        fn serialized_config_reloads() {
            let mut config = ClientConfig::default();
            config.service = config.service.with_base_url("https://proxy.example.com");
            config.credentials = keyed();

            let text = toml::to_string_pretty(&config).unwrap();
            let reloaded: ClientConfig = toml::from_str(&text).unwrap();
            assert_eq!(reloaded.service, config.service);
            assert_eq!(reloaded.credentials, config.credentials);
        }

        #[test]
        fn default_path_is_under_clinicslots() {
            assert!(ClientConfig::default_path().ends_with("clinicslots/config.toml"));
        }
    }

    mod credentials {
        use super::*;

        #[test]
        fn cipher_requires_salt_and_site() {
            let settings = CredentialSettings {
                install_salt: Some("salt".to_string()),
                ..Default::default()
            };
            let err = settings.cipher().unwrap_err();
            assert!(err.contains("install_salt and site_id"));
        }

        #[test]
        fn obfuscate_only_needs_no_key() {
            let settings = CredentialSettings {
                obfuscate_only: true,
                ..Default::default()
            };
            assert!(!settings.cipher().unwrap().mode().is_secure());
        }

        #[test]
        fn sources_resolve_env_references() {
            unsafe {
                std::env::set_var("_CLINICSLOTS_TEST_OVERRIDE", "from-env");
            }
            let settings = CredentialSettings {
                override_token: Some("env::_CLINICSLOTS_TEST_OVERRIDE".to_string()),
                legacy_token: Some("   ".to_string()),
                ..Default::default()
            };
            let sources = settings.sources().unwrap();
            assert_eq!(sources.override_token.as_deref(), Some("from-env"));
            assert_eq!(sources.legacy_token, None);
            unsafe {
                std::env::remove_var("_CLINICSLOTS_TEST_OVERRIDE");
            }
        }

        #[test]
        fn unresolvable_reference_errors() {
            let settings = CredentialSettings {
                plaintext_token: Some("env::_CLINICSLOTS_UNSET_TOKEN_4242".to_string()),
                ..Default::default()
            };
            assert!(settings.sources().unwrap_err().contains("plaintext_token"));
        }

        #[test]
        fn resolver_without_key_falls_back_to_scheduler_id() {
            let resolver = CredentialSettings::default().to_resolver().unwrap();
            let token = resolver.resolve(Some(7)).unwrap();
            assert_eq!(token.value, "7");
            assert_eq!(token.source, TokenSource::SchedulerId);
        }

        #[test]
        fn encrypted_token_without_key_errors() {
            let settings = CredentialSettings {
                encrypted_token: Some("AAAA".to_string()),
                ..Default::default()
            };
            assert!(settings.to_resolver().is_err());
        }

        #[test]
        fn resolver_decrypts_stored_token() {
            let encrypted = keyed().cipher().unwrap().encrypt("stored-secret").unwrap();
            let settings = CredentialSettings {
                encrypted_token: Some(encrypted),
                ..keyed()
            };
            let token = settings.to_resolver().unwrap().resolve(Some(7)).unwrap();
            assert_eq!(token.value, "stored-secret");
            assert_eq!(token.source, TokenSource::Encrypted);
        }
    }
}
