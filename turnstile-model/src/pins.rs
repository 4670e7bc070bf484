//! Request and response payloads for PIN generation, redemption and reporting.
//!
//! Field names are PascalCase on the wire so the admin dashboard can consume
//! them unchanged.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::subscription::SubscriptionType;

/// Upper bound on a single bulk generation batch.
pub const MAX_PINS_PER_BATCH: usize = 1000;

/// Admin request for a batch of new PIN accounts.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "PascalCase"))]
pub struct GeneratePinsRequest {
    /// Signed so out-of-range values reach batch validation instead of
    /// failing deserialization.
    pub count: i32,
    pub subscription_type: SubscriptionType,
}

/// Body of a PIN redemption when sent as JSON instead of a form.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "PascalCase"))]
pub struct AuthenticatePinRequest {
    pub pin: String,
}

/// Caller identity returned after a successful authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "PascalCase"))]
pub struct AuthenticatedUser {
    /// Absent for API keys that are not bound to a user.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub id: Option<Uuid>,
    pub name: String,
    pub role: String,
    pub is_pin_session: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_api_key: bool,
}

/// Response to a PIN redemption.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "PascalCase"))]
pub struct PinAuthenticationResult {
    pub access_token: String,
    pub user: AuthenticatedUser,
}

/// One row of the PIN directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "PascalCase"))]
pub struct PinUserSummary {
    pub id: Uuid,
    pub name: String,
    pub subscription_type: SubscriptionType,
    pub subscription_expiration_date: Option<DateTime<Utc>>,
}

/// Aggregate counts over every PIN-bearing account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "PascalCase"))]
pub struct PinReport {
    pub total: usize,
    pub active: usize,
    pub expired: usize,
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    #[test]
    fn generate_request_uses_dashboard_field_names() {
        let request: GeneratePinsRequest = serde_json::from_str(
            r#"{"Count": 10, "SubscriptionType": 3}"#,
        )
        .unwrap();
        assert_eq!(request.count, 10);
        assert_eq!(request.subscription_type, SubscriptionType::Weekly);
    }

    #[test]
    fn report_serializes_pascal_case() {
        let report = PinReport {
            total: 3,
            active: 2,
            expired: 1,
        };
        let json = serde_json::to_value(report).unwrap();
        assert_eq!(json["Total"], 3);
        assert_eq!(json["Active"], 2);
        assert_eq!(json["Expired"], 1);
    }
}
