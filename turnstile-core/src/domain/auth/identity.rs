use std::fmt;

use uuid::Uuid;

use crate::domain::users::Role;

/// Message returned for every failed PIN attempt. Unknown and expired PINs
/// are deliberately indistinguishable.
pub const INVALID_PIN_MESSAGE: &str = "Invalid PIN or expired subscription.";

/// Client and device metadata attached to token-mode principals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceClaims {
    pub device_id: Option<String>,
    pub device: Option<String>,
    pub client: Option<String>,
    pub version: Option<String>,
}

/// Authenticated caller. Built per request and never persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct Principal {
    pub username: String,
    pub role: Role,
    /// `None` for API keys not bound to a user.
    pub user_id: Option<Uuid>,
    pub token: String,
    pub is_pin_session: bool,
    pub is_api_key: bool,
    pub device: DeviceClaims,
}

impl Principal {
    pub fn is_administrator(&self) -> bool {
        self.role.is_administrator()
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Principal")
            .field("username", &self.username)
            .field("role", &self.role)
            .field("user_id", &self.user_id)
            .field("token", &"<redacted>")
            .field("is_pin_session", &self.is_pin_session)
            .field("is_api_key", &self.is_api_key)
            .field("device", &self.device)
            .finish()
    }
}

/// Why an authentication attempt was refused outright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthFailure {
    /// Unknown PIN or expired subscription.
    InvalidPin,
    /// Malformed or tampered credential.
    SecurityViolation(String),
    /// The store or the entropy source could not serve the request.
    Unavailable(String),
}

impl AuthFailure {
    /// Client-facing message.
    pub fn message(&self) -> &str {
        match self {
            AuthFailure::InvalidPin => INVALID_PIN_MESSAGE,
            AuthFailure::SecurityViolation(_) => "Invalid credentials.",
            AuthFailure::Unavailable(_) => {
                "Authentication is temporarily unavailable."
            }
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, AuthFailure::Unavailable(_))
    }
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthFailure::InvalidPin => f.write_str(INVALID_PIN_MESSAGE),
            AuthFailure::SecurityViolation(reason) => {
                write!(f, "security violation: {reason}")
            }
            AuthFailure::Unavailable(reason) => {
                write!(f, "authentication unavailable: {reason}")
            }
        }
    }
}

/// Outcome of identity resolution for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityResult {
    Success(Principal),
    /// No credential was presented; the request continues anonymously.
    NoResult,
    Fail(AuthFailure),
}

impl IdentityResult {
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            IdentityResult::Success(principal) => Some(principal),
            _ => None,
        }
    }
}
