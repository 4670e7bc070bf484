use std::fmt;

use constant_time_eq::constant_time_eq;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Keyed hashing for opaque bearer tokens before they touch the store.
///
/// Tokens are hashed with HMAC-SHA-256 under a server-side key, so a leaked
/// `access_tokens` table cannot be replayed without the key.
#[derive(Clone)]
pub struct AuthCrypto {
    token_mac: HmacSha256,
}

#[derive(Debug, Error)]
pub enum AuthCryptoError {
    #[error("token HMAC key must not be empty")]
    EmptyTokenKey,
    #[error("token HMAC key rejected: {0}")]
    InvalidTokenKey(String),
}

impl AuthCrypto {
    pub fn new(token_hmac_key: impl AsRef<[u8]>) -> Result<Self, AuthCryptoError> {
        let key = token_hmac_key.as_ref();
        if key.is_empty() {
            return Err(AuthCryptoError::EmptyTokenKey);
        }

        let token_mac = HmacSha256::new_from_slice(key)
            .map_err(|err| AuthCryptoError::InvalidTokenKey(err.to_string()))?;

        Ok(Self { token_mac })
    }

    /// Hash an opaque bearer token. The digest is returned as hex for
    /// storage in the database.
    pub fn hash_token(&self, token: &str) -> String {
        let mut mac = self.token_mac.clone();
        mac.update(token.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Constant-time check of `token` against a stored digest.
    pub fn verify_token(&self, token: &str, token_hash: &str) -> bool {
        let computed = self.hash_token(token);
        computed.len() == token_hash.len()
            && constant_time_eq(computed.as_bytes(), token_hash.as_bytes())
    }
}

impl fmt::Debug for AuthCrypto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthCrypto").finish_non_exhaustive()
    }
}
