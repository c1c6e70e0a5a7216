//! Provider credential resolution.
//!
//! - [`CredentialResolver`] - picks the auth token for a scheduler query
//! - [`TokenCipher`] - encrypts and decrypts tokens kept in stored settings

mod chain;
mod cipher;

pub use chain::{CredentialResolver, CredentialSources, ResolvedToken, TokenHook, TokenSource};
pub use cipher::{CipherMode, CredentialError, IV_LEN, TokenCipher, derive_key};
