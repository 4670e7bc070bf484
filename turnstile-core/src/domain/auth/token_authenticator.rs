use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use turnstile_model::routes::{API_KEY_QUERY_PARAM, headers};
use uuid::Uuid;

use crate::clock::Clock;
use crate::domain::repositories::{AccessTokenRepository, PinUserRepository};
use crate::domain::users::User;
use crate::error::StoreError;

use super::crypto::AuthCrypto;
use super::identity::DeviceClaims;
use super::request::AuthRequest;
use super::value_objects::{
    AuthorizationScheme, SessionToken, parse_authorization,
};

/// What the token authenticator learned about a request.
#[derive(Debug, Clone, Default)]
pub struct AuthorizationInfo {
    pub has_token: bool,
    pub is_api_key: bool,
    pub user: Option<User>,
    pub token: Option<String>,
    pub device: DeviceClaims,
}

#[derive(Debug, Error)]
pub enum AuthenticatorError {
    /// Ordinary rejection: unknown, revoked or expired credential.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Malformed or tampered credential.
    #[error("security violation: {0}")]
    SecurityViolation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Token and API-key authentication, consulted for every request that is
/// not in PIN mode.
#[async_trait]
pub trait TokenAuthenticator: Send + Sync {
    async fn authenticate(
        &self,
        request: &AuthRequest,
    ) -> Result<AuthorizationInfo, AuthenticatorError>;
}

/// Header names accepted for the `MediaBrowser` parameter list.
const AUTHORIZATION_HEADERS: [&str; 2] = ["authorization", "x-emby-authorization"];

/// Resolves bearer tokens and API keys against the access-token store.
pub struct StoredTokenAuthenticator {
    tokens: Arc<dyn AccessTokenRepository>,
    users: Arc<dyn PinUserRepository>,
    crypto: Arc<AuthCrypto>,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for StoredTokenAuthenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredTokenAuthenticator").finish_non_exhaustive()
    }
}

struct PresentedCredential {
    token: Option<String>,
    claims: DeviceClaims,
}

impl StoredTokenAuthenticator {
    pub fn new(
        tokens: Arc<dyn AccessTokenRepository>,
        users: Arc<dyn PinUserRepository>,
        crypto: Arc<AuthCrypto>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            tokens,
            users,
            crypto,
            clock,
        }
    }

    fn extract(
        request: &AuthRequest,
    ) -> Result<PresentedCredential, AuthenticatorError> {
        let mut token = None;
        let mut claims = DeviceClaims::default();

        for name in AUTHORIZATION_HEADERS {
            let Some(raw) = request.header(name) else {
                continue;
            };
            match parse_authorization(raw).map_err(|err| {
                AuthenticatorError::SecurityViolation(err.to_string())
            })? {
                AuthorizationScheme::Bearer(value) => {
                    token = Some(value);
                }
                AuthorizationScheme::MediaBrowser(auth) => {
                    claims = DeviceClaims {
                        device_id: auth.device_id,
                        device: auth.device,
                        client: auth.client,
                        version: auth.version,
                    };
                    token = auth.token;
                }
                AuthorizationScheme::Other => continue,
            }
            break;
        }

        let token = token
            .or_else(|| request.header(headers::EMBY_TOKEN).map(str::to_string))
            .or_else(|| {
                request.query_param(API_KEY_QUERY_PARAM).map(str::to_string)
            })
            .filter(|value| !value.trim().is_empty());

        Ok(PresentedCredential { token, claims })
    }
}

#[async_trait]
impl TokenAuthenticator for StoredTokenAuthenticator {
    async fn authenticate(
        &self,
        request: &AuthRequest,
    ) -> Result<AuthorizationInfo, AuthenticatorError> {
        let PresentedCredential { token, claims } = Self::extract(request)?;

        let Some(token) = token else {
            return Ok(AuthorizationInfo {
                device: claims,
                ..AuthorizationInfo::default()
            });
        };

        if !SessionToken::is_well_formed(&token) {
            return Err(AuthenticatorError::SecurityViolation(
                "malformed access token".into(),
            ));
        }

        let record = self
            .tokens
            .find_by_hash(&self.crypto.hash_token(&token))
            .await?
            .ok_or_else(|| {
                AuthenticatorError::Authentication("unknown access token".into())
            })?;

        if !self.crypto.verify_token(&token, &record.token_hash) {
            tracing::warn!(
                token_id = %record.id,
                "stored digest does not match presented token"
            );
            return Err(AuthenticatorError::Authentication(
                "access token digest mismatch".into(),
            ));
        }

        let now = self.clock.now();
        if !record.is_usable(now) {
            tracing::debug!(
                token_id = %record.id,
                revoked = record.revoked,
                "rejected unusable access token"
            );
            return Err(AuthenticatorError::Authentication(
                "access token revoked or expired".into(),
            ));
        }

        let user = match record.user_id {
            Some(user_id) => Some(self.load_owner(user_id, now).await?),
            None if record.is_api_key => None,
            None => {
                return Err(AuthenticatorError::Authentication(
                    "access token has no owner".into(),
                ));
            }
        };

        let device = DeviceClaims {
            device_id: claims.device_id.or(record.device_id),
            device: claims.device.or(record.device_name),
            client: claims.client.or(record.client),
            version: claims.version.or(record.version),
        };

        Ok(AuthorizationInfo {
            has_token: true,
            is_api_key: record.is_api_key,
            user,
            token: Some(token),
            device,
        })
    }
}

impl StoredTokenAuthenticator {
    async fn load_owner(
        &self,
        user_id: Uuid,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<User, AuthenticatorError> {
        let user = self.users.find_by_id(user_id).await?.ok_or_else(|| {
            AuthenticatorError::Authentication(
                "access token owner no longer exists".into(),
            )
        })?;

        if user.is_pin_bearing() && !user.subscription_status(now).is_active() {
            return Err(AuthenticatorError::Authentication(
                "subscription expired".into(),
            ));
        }

        Ok(user)
    }
}
