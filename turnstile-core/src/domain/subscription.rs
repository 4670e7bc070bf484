//! Subscription tiers and the active/expired decision.
//!
//! Durations only matter when a PIN is issued; afterwards the stored
//! expiration instant is the single source of truth.

use chrono::{DateTime, Duration, Utc};
use turnstile_model::{SubscriptionStatus, SubscriptionType};

use crate::error::GenerationError;

/// How long a tier stays valid after issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validity {
    For(Duration),
    Forever,
}

/// Validity window for `tier`, or `None` for the non-issuable sentinel.
pub fn validity(tier: SubscriptionType) -> Option<Validity> {
    match tier {
        SubscriptionType::None => None,
        SubscriptionType::SixHours => Some(Validity::For(Duration::hours(6))),
        SubscriptionType::TwelveHours => {
            Some(Validity::For(Duration::hours(12)))
        }
        SubscriptionType::Weekly => Some(Validity::For(Duration::days(7))),
        SubscriptionType::Monthly => Some(Validity::For(Duration::days(30))),
        SubscriptionType::Yearly => Some(Validity::For(Duration::days(365))),
        SubscriptionType::Lifetime => Some(Validity::Forever),
    }
}

/// Expiration instant for a PIN of `tier` issued at `issued_at`.
///
/// Returns `Ok(None)` for lifetime subscriptions.
pub fn expiration_for(
    tier: SubscriptionType,
    issued_at: DateTime<Utc>,
) -> Result<Option<DateTime<Utc>>, GenerationError> {
    match validity(tier) {
        Some(Validity::For(duration)) => Ok(Some(issued_at + duration)),
        Some(Validity::Forever) => Ok(None),
        None => Err(GenerationError::InvalidTier(tier)),
    }
}

/// A subscription is active strictly before its expiration instant.
pub fn status(
    expiration: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> SubscriptionStatus {
    match expiration {
        None => SubscriptionStatus::Active,
        Some(expires_at) if now < expires_at => SubscriptionStatus::Active,
        Some(_) => SubscriptionStatus::Expired,
    }
}
