use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::clock::Clock;
use crate::domain::repositories::{AccessTokenRecord, AccessTokenRepository};
use crate::error::StoreError;

use super::crypto::AuthCrypto;
use super::identity::DeviceClaims;
use super::value_objects::{SessionToken, SessionTokenError};

#[derive(Debug, Error)]
pub enum AccessTokenError {
    #[error(transparent)]
    Token(#[from] SessionTokenError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Freshly issued credential. The raw token is only available here.
#[derive(Debug)]
pub struct IssuedToken {
    pub id: Uuid,
    pub token: SessionToken,
}

/// Issues and revokes persisted API keys.
pub struct AccessTokenService {
    tokens: Arc<dyn AccessTokenRepository>,
    crypto: Arc<AuthCrypto>,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for AccessTokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessTokenService").finish_non_exhaustive()
    }
}

impl AccessTokenService {
    pub fn new(
        tokens: Arc<dyn AccessTokenRepository>,
        crypto: Arc<AuthCrypto>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            tokens,
            crypto,
            clock,
        }
    }

    /// Create an API key. API keys authenticate with the administrator role.
    pub async fn issue_api_key(
        &self,
        name: &str,
    ) -> Result<IssuedToken, AccessTokenError> {
        let token = SessionToken::generate()?;
        let record = AccessTokenRecord {
            id: Uuid::now_v7(),
            token_hash: self.crypto.hash_token(token.as_str()),
            user_id: None,
            is_api_key: true,
            name: Some(name.to_string()),
            device_id: None,
            device_name: None,
            client: None,
            version: None,
            revoked: false,
            created_at: self.clock.now(),
            expires_at: None,
        };
        self.tokens.insert(&record).await?;

        tracing::info!(token_id = %record.id, name, "issued API key");
        Ok(IssuedToken {
            id: record.id,
            token,
        })
    }

    /// Create a session token bound to `user_id`, e.g. for a device login.
    pub async fn issue_for_user(
        &self,
        user_id: Uuid,
        device: DeviceClaims,
    ) -> Result<IssuedToken, AccessTokenError> {
        let token = SessionToken::generate()?;
        let record = AccessTokenRecord {
            id: Uuid::now_v7(),
            token_hash: self.crypto.hash_token(token.as_str()),
            user_id: Some(user_id),
            is_api_key: false,
            name: None,
            device_id: device.device_id,
            device_name: device.device,
            client: device.client,
            version: device.version,
            revoked: false,
            created_at: self.clock.now(),
            expires_at: None,
        };
        self.tokens.insert(&record).await?;

        tracing::debug!(token_id = %record.id, user_id = %user_id, "issued user token");
        Ok(IssuedToken {
            id: record.id,
            token,
        })
    }

    pub async fn revoke(&self, id: Uuid) -> Result<bool, AccessTokenError> {
        let revoked = self.tokens.revoke(id).await?;
        if revoked {
            tracing::info!(token_id = %id, "revoked access token");
        }
        Ok(revoked)
    }
}
