use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use constant_time_eq::constant_time_eq;
use rand::{TryRngCore, rngs::OsRng};
use std::fmt;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Errors that can occur when working with session tokens
#[derive(Debug, Error)]
pub enum SessionTokenError {
    #[error("Invalid token format")]
    InvalidFormat,

    #[error("Token generation failed")]
    GenerationFailed,
}

/// Opaque bearer token with 256 bits of OS entropy, URL-safe base64 encoded.
///
/// The value is wiped from memory on drop and never derived from any user
/// input.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SessionToken {
    value: String,
}

impl SessionToken {
    const BYTES: usize = 32;
    const MIN_PRESENTED_LEN: usize = 16;
    const MAX_PRESENTED_LEN: usize = 512;

    pub fn generate() -> Result<Self, SessionTokenError> {
        let mut token_bytes = [0u8; Self::BYTES];
        OsRng
            .try_fill_bytes(&mut token_bytes)
            .map_err(|_| SessionTokenError::GenerationFailed)?;

        let value = URL_SAFE_NO_PAD.encode(token_bytes);
        token_bytes.zeroize();

        Ok(Self { value })
    }

    /// Wrap a token presented by a client after checking its shape.
    pub fn from_presented(value: &str) -> Result<Self, SessionTokenError> {
        if !Self::is_well_formed(value) {
            return Err(SessionTokenError::InvalidFormat);
        }
        Ok(Self {
            value: value.to_string(),
        })
    }

    /// Accepts URL-safe base64 and hex tokens of a plausible length.
    pub fn is_well_formed(value: &str) -> bool {
        (Self::MIN_PRESENTED_LEN..=Self::MAX_PRESENTED_LEN)
            .contains(&value.len())
            && value
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_string(self) -> String {
        self.value.clone()
    }

    /// Constant-time comparison with another token
    pub fn secure_compare(&self, other: &str) -> bool {
        let self_bytes = self.value.as_bytes();
        let other_bytes = other.as_bytes();

        if self_bytes.len() != other_bytes.len() {
            return false;
        }

        constant_time_eq(self_bytes, other_bytes)
    }

    /// First characters of a token, safe to log.
    pub fn preview(value: &str) -> String {
        let preview: String = value.chars().take(8).collect();
        format!("{preview}...")
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&Self::preview(&self.value))
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SessionToken")
            .field(&Self::preview(&self.value))
            .finish()
    }
}
