use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::error::ModelError;

/// Subscription tier attached to a PIN-bearing account.
///
/// The discriminants are persisted as an `INTEGER` column and are also what the
/// admin dashboard posts, so they must never be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[repr(i32)]
pub enum SubscriptionType {
    /// Sentinel for accounts that are not PIN-bearing.
    #[default]
    None = 0,
    SixHours = 1,
    TwelveHours = 2,
    Weekly = 3,
    Monthly = 4,
    Yearly = 5,
    /// Never expires.
    Lifetime = 6,
}

impl SubscriptionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionType::None => "None",
            SubscriptionType::SixHours => "SixHours",
            SubscriptionType::TwelveHours => "TwelveHours",
            SubscriptionType::Weekly => "Weekly",
            SubscriptionType::Monthly => "Monthly",
            SubscriptionType::Yearly => "Yearly",
            SubscriptionType::Lifetime => "Lifetime",
        }
    }

    pub fn as_i32(&self) -> i32 {
        *self as i32
    }

    /// Whether this tier may be attached to a freshly generated PIN.
    pub fn is_issuable(&self) -> bool {
        !matches!(self, SubscriptionType::None)
    }
}

impl Display for SubscriptionType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<i32> for SubscriptionType {
    type Error = ModelError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(SubscriptionType::None),
            1 => Ok(SubscriptionType::SixHours),
            2 => Ok(SubscriptionType::TwelveHours),
            3 => Ok(SubscriptionType::Weekly),
            4 => Ok(SubscriptionType::Monthly),
            5 => Ok(SubscriptionType::Yearly),
            6 => Ok(SubscriptionType::Lifetime),
            other => Err(ModelError::UnknownSubscriptionType(other.to_string())),
        }
    }
}

impl FromStr for SubscriptionType {
    type Err = ModelError;

    /// Accepts either the tier name (case-insensitive) or its numeric value.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(number) = trimmed.parse::<i32>() {
            return SubscriptionType::try_from(number);
        }

        match trimmed.to_ascii_lowercase().as_str() {
            "none" => Ok(SubscriptionType::None),
            "sixhours" => Ok(SubscriptionType::SixHours),
            "twelvehours" => Ok(SubscriptionType::TwelveHours),
            "weekly" => Ok(SubscriptionType::Weekly),
            "monthly" => Ok(SubscriptionType::Monthly),
            "yearly" => Ok(SubscriptionType::Yearly),
            "lifetime" => Ok(SubscriptionType::Lifetime),
            _ => Err(ModelError::UnknownSubscriptionType(trimmed.to_string())),
        }
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for SubscriptionType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(i32),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Number(n) => {
                SubscriptionType::try_from(n).map_err(serde::de::Error::custom)
            }
            Repr::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Evaluated state of a subscription at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SubscriptionStatus {
    Active,
    Expired,
}

impl SubscriptionStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, SubscriptionStatus::Active)
    }
}

impl Display for SubscriptionStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SubscriptionStatus::Active => f.write_str("active"),
            SubscriptionStatus::Expired => f.write_str("expired"),
        }
    }
}

/// Status filter accepted by the PIN directory listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum StatusFilter {
    #[default]
    Active,
    Expired,
    All,
}

impl StatusFilter {
    /// Whether a holder in `status` passes this filter.
    pub fn matches(&self, status: SubscriptionStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => status == SubscriptionStatus::Active,
            StatusFilter::Expired => status == SubscriptionStatus::Expired,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(StatusFilter::Active),
            "expired" => Ok(StatusFilter::Expired),
            "all" => Ok(StatusFilter::All),
            other => Err(ModelError::UnknownStatusFilter(other.to_string())),
        }
    }
}
