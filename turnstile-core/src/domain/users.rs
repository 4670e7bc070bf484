use std::fmt;

use chrono::{DateTime, Utc};
use turnstile_model::{PinUserSummary, SubscriptionStatus, SubscriptionType};
use uuid::Uuid;

use super::subscription;

/// Authorization role carried by an authenticated principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Administrator,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Administrator => "Administrator",
        }
    }

    pub fn is_administrator(&self) -> bool {
        matches!(self, Role::Administrator)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored user record, including the PIN subscription columns.
///
/// A user is PIN-bearing iff `pin_code` is set and non-empty. PIN-bearing
/// users always carry a tier other than [`SubscriptionType::None`], and
/// their `expiration_date` is `None` only for lifetime subscriptions.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub is_administrator: bool,
    pub pin_code: Option<String>,
    pub subscription_type: SubscriptionType,
    pub expiration_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Build the record for a freshly issued PIN.
    pub fn pin_holder(
        pin_code: String,
        subscription_type: SubscriptionType,
        expiration_date: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let id = Uuid::now_v7();
        Self {
            id,
            username: format!("pin_{}", id.simple()),
            is_administrator: false,
            pin_code: Some(pin_code),
            subscription_type,
            expiration_date,
            created_at,
        }
    }

    pub fn is_pin_bearing(&self) -> bool {
        self.pin_code.as_deref().is_some_and(|code| !code.is_empty())
    }

    pub fn subscription_status(&self, now: DateTime<Utc>) -> SubscriptionStatus {
        subscription::status(self.expiration_date, now)
    }

    pub fn role(&self) -> Role {
        if self.is_administrator {
            Role::Administrator
        } else {
            Role::User
        }
    }

    pub fn summary(&self) -> PinUserSummary {
        PinUserSummary {
            id: self.id,
            name: self.username.clone(),
            subscription_type: self.subscription_type,
            subscription_expiration_date: self.expiration_date,
        }
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("is_administrator", &self.is_administrator)
            .field("pin_code", &self.pin_code.as_ref().map(|_| "<redacted>"))
            .field("subscription_type", &self.subscription_type)
            .field("expiration_date", &self.expiration_date)
            .field("created_at", &self.created_at)
            .finish()
    }
}
