use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use turnstile_model::SubscriptionType;
use uuid::Uuid;

use crate::domain::users::User;
use crate::error::Result;

#[async_trait]
pub trait PinUserRepository: Send + Sync {
    /// Round trip to the backing store without touching any record.
    async fn ping(&self) -> Result<()>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;

    /// Exact, case-sensitive lookup of the PIN-bearing user holding `pin`.
    async fn find_by_pin(&self, pin: &str) -> Result<Option<User>>;

    /// Subset of `candidates` already assigned to some user.
    async fn existing_pins(
        &self,
        candidates: &[String],
    ) -> Result<HashSet<String>>;

    /// Persist every record or none of them.
    ///
    /// A PIN uniqueness conflict fails the whole write with
    /// [`StoreError::DuplicatePin`](crate::error::StoreError::DuplicatePin).
    async fn insert_batch(&self, users: &[User]) -> Result<()>;

    /// Insert a single non-PIN account (administrators, service users).
    async fn insert_user(&self, user: &User) -> Result<()>;

    /// All PIN-bearing users, optionally narrowed to one tier, ordered by
    /// creation time.
    async fn list_pin_users(
        &self,
        tier: Option<SubscriptionType>,
    ) -> Result<Vec<User>>;
}

/// Persisted access token or API key. Only the HMAC digest of the token is
/// stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessTokenRecord {
    pub id: Uuid,
    pub token_hash: String,
    pub user_id: Option<Uuid>,
    pub is_api_key: bool,
    pub name: Option<String>,
    pub device_id: Option<String>,
    pub device_name: Option<String>,
    pub client: Option<String>,
    pub version: Option<String>,
    pub revoked: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl AccessTokenRecord {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at)
    }

    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && !self.is_expired(now)
    }
}

#[async_trait]
pub trait AccessTokenRepository: Send + Sync {
    async fn find_by_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<AccessTokenRecord>>;

    async fn insert(&self, record: &AccessTokenRecord) -> Result<()>;

    /// Returns `false` when no live token with `id` exists.
    async fn revoke(&self, id: Uuid) -> Result<bool>;
}
