//! Per-request identity resolution.
//!
//! [`AuthenticationResolver::resolve`] picks exactly one mode:
//!
//! 1. **PIN mode** when the path is the PIN endpoint or the marker header is
//!    present. The PIN is looked up and its subscription evaluated.
//! 2. **Token mode** otherwise, delegated to a [`TokenAuthenticator`].
//!
//! Once a mode is chosen there is no fallthrough to the other one.

use std::fmt;
use std::sync::Arc;

use turnstile_model::routes::{headers, v1};

use crate::clock::Clock;
use crate::domain::repositories::PinUserRepository;
use crate::domain::users::Role;

use super::identity::{AuthFailure, DeviceClaims, IdentityResult, Principal};
use super::request::AuthRequest;
use super::token_authenticator::{AuthenticatorError, TokenAuthenticator};
use super::value_objects::{PinCode, PinCodeError, SessionToken};

/// Where PIN credentials are looked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinAuthSettings {
    pub endpoint: String,
    pub marker_header: String,
    pub pin_header: String,
    pub pin_field: String,
}

impl Default for PinAuthSettings {
    fn default() -> Self {
        Self {
            endpoint: v1::users::AUTHENTICATE_WITH_PIN.to_string(),
            marker_header: headers::PIN_AUTH_MARKER.to_string(),
            pin_header: headers::PIN.to_string(),
            pin_field: "Pin".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Pin,
    Token,
}

pub struct AuthenticationResolver {
    users: Arc<dyn PinUserRepository>,
    tokens: Arc<dyn TokenAuthenticator>,
    clock: Arc<dyn Clock>,
    settings: PinAuthSettings,
}

impl fmt::Debug for AuthenticationResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticationResolver")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl AuthenticationResolver {
    pub fn new(
        users: Arc<dyn PinUserRepository>,
        tokens: Arc<dyn TokenAuthenticator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::with_settings(users, tokens, clock, PinAuthSettings::default())
    }

    pub fn with_settings(
        users: Arc<dyn PinUserRepository>,
        tokens: Arc<dyn TokenAuthenticator>,
        clock: Arc<dyn Clock>,
        settings: PinAuthSettings,
    ) -> Self {
        Self {
            users,
            tokens,
            clock,
            settings,
        }
    }

    pub fn settings(&self) -> &PinAuthSettings {
        &self.settings
    }

    /// Whether `path` addresses the PIN endpoint.
    pub fn is_pin_endpoint(&self, path: &str) -> bool {
        path_starts_with_segments(path, &self.settings.endpoint)
    }

    /// The single rule deciding between PIN and token mode. A `Pin` body
    /// field on any other endpoint never selects PIN mode.
    pub fn detect_mode(&self, request: &AuthRequest) -> AuthMode {
        if self.is_pin_endpoint(request.path())
            || request.has_header(&self.settings.marker_header)
        {
            AuthMode::Pin
        } else {
            AuthMode::Token
        }
    }

    /// Header first, then the body field (only read on the PIN endpoint).
    /// A blank header does not hide the body field.
    pub fn extract_pin<'a>(&self, request: &'a AuthRequest) -> Option<&'a str> {
        request
            .header(&self.settings.pin_header)
            .filter(|value| !value.trim().is_empty())
            .or_else(|| {
                if self.is_pin_endpoint(request.path()) {
                    request.form_field(&self.settings.pin_field)
                } else {
                    None
                }
            })
    }

    pub async fn resolve(&self, request: &AuthRequest) -> IdentityResult {
        match self.detect_mode(request) {
            AuthMode::Pin => self.resolve_pin(request).await,
            AuthMode::Token => self.resolve_token(request).await,
        }
    }

    async fn resolve_pin(&self, request: &AuthRequest) -> IdentityResult {
        let pin = match PinCode::parse(self.extract_pin(request).unwrap_or("")) {
            Ok(pin) => pin,
            Err(PinCodeError::Empty) => return IdentityResult::NoResult,
            Err(PinCodeError::TooLong { .. }) => {
                return IdentityResult::Fail(AuthFailure::InvalidPin);
            }
        };

        let user = match self.users.find_by_pin(pin.as_str()).await {
            Ok(Some(user)) if user.is_pin_bearing() => user,
            Ok(_) => {
                tracing::debug!("PIN authentication failed: unknown PIN");
                return IdentityResult::Fail(AuthFailure::InvalidPin);
            }
            Err(err) => {
                tracing::warn!(error = %err, "PIN lookup failed");
                return IdentityResult::Fail(AuthFailure::Unavailable(
                    err.to_string(),
                ));
            }
        };

        if !user.subscription_status(self.clock.now()).is_active() {
            tracing::debug!(
                user_id = %user.id,
                "PIN authentication failed: subscription expired"
            );
            return IdentityResult::Fail(AuthFailure::InvalidPin);
        }

        let token = match SessionToken::generate() {
            Ok(token) => token,
            Err(err) => {
                tracing::error!(error = %err, "failed to mint PIN session token");
                return IdentityResult::Fail(AuthFailure::Unavailable(
                    err.to_string(),
                ));
            }
        };

        tracing::debug!(user_id = %user.id, "PIN authentication succeeded");
        IdentityResult::Success(Principal {
            username: user.username.clone(),
            role: user.role(),
            user_id: Some(user.id),
            token: token.into_string(),
            is_pin_session: true,
            is_api_key: false,
            device: DeviceClaims::default(),
        })
    }

    async fn resolve_token(&self, request: &AuthRequest) -> IdentityResult {
        let info = match self.tokens.authenticate(request).await {
            Ok(info) => info,
            Err(AuthenticatorError::Authentication(reason)) => {
                tracing::debug!(%reason, "token authentication rejected");
                return IdentityResult::NoResult;
            }
            Err(AuthenticatorError::SecurityViolation(reason)) => {
                tracing::warn!(%reason, "token authentication security violation");
                return IdentityResult::Fail(AuthFailure::SecurityViolation(
                    reason,
                ));
            }
            Err(AuthenticatorError::Store(err)) => {
                tracing::warn!(error = %err, "token lookup failed");
                return IdentityResult::Fail(AuthFailure::Unavailable(
                    err.to_string(),
                ));
            }
        };

        let token = match info.token {
            Some(token) if info.has_token => token,
            _ => return IdentityResult::NoResult,
        };

        let is_admin_user =
            info.user.as_ref().is_some_and(|user| user.is_administrator);
        let role = if info.is_api_key || is_admin_user {
            Role::Administrator
        } else {
            Role::User
        };

        IdentityResult::Success(Principal {
            username: info
                .user
                .as_ref()
                .map(|user| user.username.clone())
                .unwrap_or_default(),
            role,
            user_id: info.user.as_ref().map(|user| user.id),
            token,
            is_pin_session: false,
            is_api_key: info.is_api_key,
            device: info.device,
        })
    }
}

/// Segment-aligned, ASCII case-insensitive prefix match on a request path.
pub fn path_starts_with_segments(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return true;
    }
    if path.len() < prefix.len() || !path.is_char_boundary(prefix.len()) {
        return false;
    }

    let (head, tail) = path.split_at(prefix.len());
    head.eq_ignore_ascii_case(prefix) && (tail.is_empty() || tail.starts_with('/'))
}
