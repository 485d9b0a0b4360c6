//! Signing Key Derivation
//!
//! Derives the symmetric HS256 key pair from the configured secret.

use jsonwebtoken::{DecodingKey, EncodingKey};

use crate::error::{AuthError, Result};

/// HMAC-SHA256 keys need at least 256 bits of entropy.
pub const MIN_SECRET_BYTES: usize = 32;

/// Symmetric signing material for HS256 tokens.
///
/// Construction is pure and deterministic; a secret below the minimum
/// length is a configuration error and fails at startup.
pub struct SigningKey {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningKey {
    pub fn from_secret(secret: &str) -> Result<Self> {
        if secret.is_empty() {
            return Err(AuthError::configuration("signing secret must not be empty"));
        }
        if secret.len() < MIN_SECRET_BYTES {
            return Err(AuthError::configuration(format!(
                "signing secret must be at least {MIN_SECRET_BYTES} bytes, got {}",
                secret.len()
            )));
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        })
    }

    pub fn encoding(&self) -> &EncodingKey {
        &self.encoding
    }

    pub fn decoding(&self) -> &DecodingKey {
        &self.decoding
    }
}
