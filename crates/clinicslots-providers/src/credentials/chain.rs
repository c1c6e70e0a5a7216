//! Token resolution chain.
//!
//! Sources are tried in a fixed order and the first non-empty value wins:
//!
//! 1. operator override token (ignored when equal to the placeholder sentinel)
//! 2. legacy token setting
//! 3. encrypted stored token, decrypted with [`TokenCipher`]
//! 4. plaintext stored token
//! 5. programmatic hook
//! 6. the scheduler id itself, as a string

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::cipher::TokenCipher;

/// Programmatic token override, called with the scheduler being queried.
pub type TokenHook = Arc<dyn Fn(Option<i64>) -> Option<String> + Send + Sync>;

/// Statically configured token sources.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialSources {
    /// Operator-set token.
    pub override_token: Option<String>,
    /// Token stored under the legacy setting name.
    pub legacy_token: Option<String>,
    /// `base64(iv || ciphertext)` as written by [`TokenCipher::encrypt`].
    pub encrypted_token: Option<String>,
    /// Token stored before encryption was introduced.
    pub plaintext_token: Option<String>,
    /// Value that marks the override token as unset (e.g. a sample config value).
    pub placeholder: Option<String>,
}

impl fmt::Debug for CredentialSources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let set = |v: &Option<String>| if v.is_some() { "[SET]" } else { "[UNSET]" };
        f.debug_struct("CredentialSources")
            .field("override_token", &set(&self.override_token))
            .field("legacy_token", &set(&self.legacy_token))
            .field("encrypted_token", &set(&self.encrypted_token))
            .field("plaintext_token", &set(&self.plaintext_token))
            .field("placeholder", &self.placeholder)
            .finish()
    }
}

/// Which step of the chain produced a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenSource {
    Override,
    Legacy,
    Encrypted,
    Plaintext,
    Hook,
    SchedulerId,
}

impl TokenSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Override => "override",
            Self::Legacy => "legacy",
            Self::Encrypted => "encrypted",
            Self::Plaintext => "plaintext",
            Self::Hook => "hook",
            Self::SchedulerId => "scheduler_id",
        }
    }

    /// Returns true for the legacy fallback where no real credential exists.
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::SchedulerId)
    }
}

impl fmt::Display for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved token and where it came from.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedToken {
    pub value: String,
    pub source: TokenSource,
}

impl fmt::Debug for ResolvedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedToken")
            .field("value", &"[REDACTED]")
            .field("source", &self.source)
            .finish()
    }
}

/// Resolves the auth token sent to the scheduling provider.
#[derive(Clone)]
pub struct CredentialResolver {
    sources: CredentialSources,
    cipher: TokenCipher,
    hook: Option<TokenHook>,
}

impl fmt::Debug for CredentialResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialResolver")
            .field("sources", &self.sources)
            .field("cipher", &self.cipher)
            .field("hook", &self.hook.is_some())
            .finish()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl CredentialResolver {
    pub fn new(sources: CredentialSources, cipher: TokenCipher) -> Self {
        Self {
            sources,
            cipher,
            hook: None,
        }
    }

    /// Installs a programmatic override consulted after the stored tokens.
    pub fn with_hook(mut self, hook: TokenHook) -> Self {
        self.hook = Some(hook);
        self
    }

    pub fn sources(&self) -> &CredentialSources {
        &self.sources
    }

    pub fn cipher(&self) -> &TokenCipher {
        &self.cipher
    }

    /// Returns the first available token, or `None` when every source is
    /// empty and no scheduler id is known.
    ///
    /// Decryption failures are logged and skipped.
    pub fn resolve(&self, scheduler_id: Option<i64>) -> Option<ResolvedToken> {
        let resolved = self.resolve_inner(scheduler_id);
        match &resolved {
            Some(token) => debug!(
                scheduler_id = ?scheduler_id,
                source = token.source.as_str(),
                "resolved provider token"
            ),
            None => debug!("no provider token and no scheduler id"),
        }
        resolved
    }

    fn resolve_inner(&self, scheduler_id: Option<i64>) -> Option<ResolvedToken> {
        let found = |value: &str, source| {
            Some(ResolvedToken {
                value: value.to_string(),
                source,
            })
        };

        if let Some(token) = non_empty(self.sources.override_token.as_deref())
            && !self.is_placeholder(token)
        {
            return found(token, TokenSource::Override);
        }

        if let Some(token) = non_empty(self.sources.legacy_token.as_deref()) {
            return found(token, TokenSource::Legacy);
        }

        if let Some(encrypted) = non_empty(self.sources.encrypted_token.as_deref()) {
            match self.cipher.decrypt(encrypted) {
                Ok(token) if !token.trim().is_empty() => {
                    return found(token.trim(), TokenSource::Encrypted);
                }
                Ok(_) => debug!("stored encrypted token decrypted to an empty value"),
                Err(e) => warn!(
                    error = %e,
                    mode = self.cipher.mode().as_str(),
                    "failed to decrypt stored token, trying next source"
                ),
            }
        }

        if let Some(token) = non_empty(self.sources.plaintext_token.as_deref()) {
            return found(token, TokenSource::Plaintext);
        }

        if let Some(hook) = &self.hook
            && let Some(value) = hook(scheduler_id)
            && let Some(token) = non_empty(Some(&value))
        {
            return found(token, TokenSource::Hook);
        }

        scheduler_id.and_then(|id| found(&id.to_string(), TokenSource::SchedulerId))
    }

    fn is_placeholder(&self, token: &str) -> bool {
        non_empty(self.sources.placeholder.as_deref()).is_some_and(|p| p == token)
    }
}
