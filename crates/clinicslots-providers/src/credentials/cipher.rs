//! Stored-token encryption.
//!
//! Tokens persisted in the content store's settings are encrypted with
//! AES-256-CBC. The key is `SHA-256(install_salt + site_id)`; a random 16-byte
//! IV is prepended to the ciphertext and the pair is base64-encoded as a unit.
//!
//! Builds without the `encryption` feature, or a cipher created with
//! [`TokenCipher::obfuscating`], only base64-encode the token. That mode is
//! reversible by anyone and is always logged as obfuscation.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::warn;

#[cfg(feature = "encryption")]
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, block_padding::Pkcs7};
#[cfg(feature = "encryption")]
use rand::Rng as _;

/// AES block and IV size in bytes.
pub const IV_LEN: usize = 16;

#[cfg(feature = "encryption")]
type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
#[cfg(feature = "encryption")]
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Errors decrypting or encrypting a stored token.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("stored token is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("stored token is too short ({len} bytes, need more than {IV_LEN})")]
    TooShort { len: usize },

    #[error("ciphertext length {len} is not a multiple of the block size")]
    InvalidLength { len: usize },

    #[error("stored token has invalid padding (wrong key or corrupted data)")]
    Padding,

    #[error("decrypted token is not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("cipher error: {0}")]
    Cipher(String),
}

/// How a [`TokenCipher`] protects tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherMode {
    /// AES-256-CBC with a random IV.
    Aes256Cbc,
    /// Plain base64. Not encryption.
    Obfuscated,
}

impl CipherMode {
    /// Returns true if tokens are actually encrypted.
    pub fn is_secure(&self) -> bool {
        matches!(self, Self::Aes256Cbc)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aes256Cbc => "aes-256-cbc",
            Self::Obfuscated => "base64-obfuscation",
        }
    }
}

impl std::fmt::Display for CipherMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Encrypts and decrypts stored provider tokens.
#[derive(Clone)]
pub struct TokenCipher {
    #[cfg_attr(not(feature = "encryption"), allow(dead_code))]
    key: [u8; 32],
    mode: CipherMode,
}

impl std::fmt::Debug for TokenCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCipher")
            .field("key", &"[REDACTED]")
            .field("mode", &self.mode)
            .finish()
    }
}

/// Derives the AES key from the installation salt and site identifier.
pub fn derive_key(install_salt: &str, site_id: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(install_salt.as_bytes());
    hasher.update(site_id.as_bytes());
    hasher.finalize().into()
}

impl TokenCipher {
    /// Creates a cipher keyed by the installation salt and site identifier.
    ///
    /// Without the `encryption` feature this falls back to obfuscation.
    pub fn new(install_salt: &str, site_id: &str) -> Self {
        let key = derive_key(install_salt, site_id);
        if cfg!(feature = "encryption") {
            Self {
                key,
                mode: CipherMode::Aes256Cbc,
            }
        } else {
            warn!(
                mode = CipherMode::Obfuscated.as_str(),
                "built without encryption support; stored tokens are only obfuscated"
            );
            Self {
                key,
                mode: CipherMode::Obfuscated,
            }
        }
    }

    /// Creates a cipher that only base64-encodes tokens.
    pub fn obfuscating() -> Self {
        warn!(
            mode = CipherMode::Obfuscated.as_str(),
            "token cipher in obfuscation mode; stored tokens are NOT encrypted"
        );
        Self {
            key: [0; 32],
            mode: CipherMode::Obfuscated,
        }
    }

    pub fn mode(&self) -> CipherMode {
        self.mode
    }

    /// Encrypts a token, returning `base64(iv || ciphertext)`.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CredentialError> {
        match self.mode {
            CipherMode::Obfuscated => Ok(STANDARD.encode(plaintext.as_bytes())),
            CipherMode::Aes256Cbc => self.encrypt_aes(plaintext),
        }
    }

    /// Decrypts a value produced by [`encrypt`](Self::encrypt).
    pub fn decrypt(&self, encoded: &str) -> Result<String, CredentialError> {
        let bytes = STANDARD.decode(encoded.trim())?;
        match self.mode {
            CipherMode::Obfuscated => Ok(String::from_utf8(bytes)?),
            CipherMode::Aes256Cbc => self.decrypt_aes(&bytes),
        }
    }

    #[cfg(feature = "encryption")]
    fn encrypt_aes(&self, plaintext: &str) -> Result<String, CredentialError> {
        let iv: [u8; IV_LEN] = rand::rng().random();
        let cipher = Aes256CbcEnc::new_from_slices(&self.key, &iv)
            .map_err(|e| CredentialError::Cipher(e.to_string()))?;
        let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());

        let mut out = Vec::with_capacity(IV_LEN + ciphertext.len());
        out.extend_from_slice(&iv);
        out.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(out))
    }

    #[cfg(feature = "encryption")]
    fn decrypt_aes(&self, bytes: &[u8]) -> Result<String, CredentialError> {
        if bytes.len() <= IV_LEN {
            return Err(CredentialError::TooShort { len: bytes.len() });
        }
        let (iv, ciphertext) = bytes.split_at(IV_LEN);
        if ciphertext.len() % IV_LEN != 0 {
            return Err(CredentialError::InvalidLength {
                len: ciphertext.len(),
            });
        }
        let cipher = Aes256CbcDec::new_from_slices(&self.key, iv)
            .map_err(|e| CredentialError::Cipher(e.to_string()))?;
        let plaintext = cipher
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|_| CredentialError::Padding)?;
        Ok(String::from_utf8(plaintext)?)
    }

    #[cfg(not(feature = "encryption"))]
    fn encrypt_aes(&self, _plaintext: &str) -> Result<String, CredentialError> {
        Err(CredentialError::Cipher("built without encryption support".into()))
    }

    #[cfg(not(feature = "encryption"))]
    fn decrypt_aes(&self, _bytes: &[u8]) -> Result<String, CredentialError> {
        Err(CredentialError::Cipher("built without encryption support".into()))
    }
}
