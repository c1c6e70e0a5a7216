//! Token commands: encrypt and decrypt stored tokens, inspect resolution.

use tracing::debug;

use clinicslots_providers::{ResolvedToken, TokenCipher};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

fn cipher(config: &ClientConfig) -> ClientResult<TokenCipher> {
    let cipher = config.credentials.cipher().map_err(ClientError::Config)?;
    debug!(mode = cipher.mode().as_str(), "token cipher ready");
    Ok(cipher)
}

/// Encrypts a token for the `encrypted_token` setting.
pub fn encrypt(token: &str, config: &ClientConfig) -> ClientResult<String> {
    let token = token.trim();
    if token.is_empty() {
        return Err(ClientError::Input("token must not be empty".into()));
    }
    Ok(cipher(config)?.encrypt(token)?)
}

/// Decrypts a stored `encrypted_token` value.
pub fn decrypt(ciphertext: &str, config: &ClientConfig) -> ClientResult<String> {
    Ok(cipher(config)?.decrypt(ciphertext)?)
}

/// Resolves the token that would be sent for `scheduler`.
pub fn resolve(scheduler: Option<i64>, config: &ClientConfig) -> ClientResult<Option<ResolvedToken>> {
    let resolver = config.credentials.to_resolver().map_err(ClientError::Config)?;
    Ok(resolver.resolve(scheduler))
}

/// Formats a resolution for display. The value is only included with `show`.
pub fn describe(resolved: Option<&ResolvedToken>, show: bool) -> String {
    match resolved {
        None => "no token: no source is configured and no scheduler was given".to_string(),
        Some(token) => {
            let mut out = format!("source: {}", token.source.as_str());
            if token.source.is_fallback() {
                out.push_str(" (fallback)");
            }
            if show {
                out.push_str(&format!("\ntoken: {}", token.value));
            }
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CredentialSettings;
    use clinicslots_providers::TokenSource;

    fn config() -> ClientConfig {
        ClientConfig {
            credentials: CredentialSettings {
                install_salt: Some("salt".into()),
                site_id: Some("site".into()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn encrypt_then_decrypt() {
        let config = config();
        let stored = encrypt("  proxy-token  ", &config).unwrap();
        assert_ne!(stored, "proxy-token");
        assert_eq!(decrypt(&stored, &config).unwrap(), "proxy-token");
    }

    #[test]
    fn encrypt_rejects_empty_token() {
        assert!(matches!(encrypt("   ", &config()), Err(ClientError::Input(_))));
    }

    #[test]
    fn encrypt_without_key_is_config_error() {
        assert!(matches!(
            encrypt("tok", &ClientConfig::default()),
            Err(ClientError::Config(_))
        ));
    }

    #[test]
    fn decrypt_garbage_is_credential_error() {
        assert!(matches!(
            decrypt("not base64!", &config()),
            Err(ClientError::Credential(_))
        ));
    }

    #[test]
    fn resolve_prefers_stored_token() {
        let mut config = config();
        config.credentials.encrypted_token = Some(encrypt("stored", &config).unwrap());

        let token = resolve(Some(7), &config).unwrap().unwrap();
        assert_eq!(token.source, TokenSource::Encrypted);
        assert_eq!(token.value, "stored");
    }

    mod display {
        use super::*;

        #[test]
        fn hides_value_by_default() {
            let token = resolve(Some(7), &ClientConfig::default()).unwrap();
            let text = describe(token.as_ref(), false);
            assert_eq!(text, "source: scheduler_id (fallback)");
        }

        #[test]
        fn shows_value_on_request() {
            let mut config = config();
            config.credentials.override_token = Some("secret".into());
            let token = resolve(None, &config).unwrap();
            assert_eq!(describe(token.as_ref(), true), "source: override\ntoken: secret");
        }

        #[test]
        fn no_token() {
            let token = resolve(None, &ClientConfig::default()).unwrap();
            assert!(describe(token.as_ref(), false).starts_with("no token"));
        }
    }
}
