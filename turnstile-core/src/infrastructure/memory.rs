//! In-process stores for development mode and tests.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use parking_lot::RwLock;
use turnstile_model::SubscriptionType;
use uuid::Uuid;

use crate::domain::repositories::{
    AccessTokenRecord, AccessTokenRepository, PinUserRepository,
};
use crate::domain::users::User;
use crate::error::{Result, StoreError};

/// User store guarded by a single lock. Batch inserts check and write
/// under one write guard, so two batches can never both claim a code.
#[derive(Debug, Default)]
pub struct InMemoryPinUserRepository {
    users: RwLock<Vec<User>>,
}

impl InMemoryPinUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: Vec<User>) -> Self {
        Self {
            users: RwLock::new(users),
        }
    }

    pub fn len(&self) -> usize {
        self.users.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.read().is_empty()
    }

    fn check_insertable(
        existing: &[User],
        incoming: &[User],
    ) -> std::result::Result<(), StoreError> {
        let taken_pins: HashSet<&str> = existing
            .iter()
            .filter_map(|user| user.pin_code.as_deref())
            .collect();
        let taken_names: HashSet<&str> =
            existing.iter().map(|user| user.username.as_str()).collect();

        let mut batch_pins = HashSet::new();
        let mut batch_names = HashSet::new();
        let mut conflicts = Vec::new();

        for user in incoming {
            if taken_names.contains(user.username.as_str())
                || !batch_names.insert(user.username.as_str())
            {
                return Err(StoreError::DuplicateUsername(user.username.clone()));
            }
            if let Some(pin) = user.pin_code.as_deref().filter(|p| !p.is_empty())
                && (taken_pins.contains(pin) || !batch_pins.insert(pin))
            {
                conflicts.push(pin.to_string());
            }
        }

        if conflicts.is_empty() {
            Ok(())
        } else {
            Err(StoreError::DuplicatePin(conflicts))
        }
    }
}

#[async_trait]
impl PinUserRepository for InMemoryPinUserRepository {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.users.read().iter().find(|user| user.id == id).cloned())
    }

    async fn find_by_pin(&self, pin: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .read()
            .iter()
            .find(|user| user.pin_code.as_deref() == Some(pin))
            .cloned())
    }

    async fn existing_pins(
        &self,
        candidates: &[String],
    ) -> Result<HashSet<String>> {
        let wanted: HashSet<&str> =
            candidates.iter().map(String::as_str).collect();
        Ok(self
            .users
            .read()
            .iter()
            .filter_map(|user| user.pin_code.as_deref())
            .filter(|pin| wanted.contains(pin))
            .map(str::to_string)
            .collect())
    }

    async fn insert_batch(&self, users: &[User]) -> Result<()> {
        let mut guard = self.users.write();
        Self::check_insertable(&guard, users)?;
        guard.extend_from_slice(users);
        Ok(())
    }

    async fn insert_user(&self, user: &User) -> Result<()> {
        self.insert_batch(std::slice::from_ref(user)).await
    }

    async fn list_pin_users(
        &self,
        tier: Option<SubscriptionType>,
    ) -> Result<Vec<User>> {
        let mut users: Vec<User> = self
            .users
            .read()
            .iter()
            .filter(|user| user.is_pin_bearing())
            .filter(|user| tier.is_none_or(|tier| user.subscription_type == tier))
            .cloned()
            .collect();
        // Stable sort keeps insertion order within one batch.
        users.sort_by_key(|user| user.created_at);
        Ok(users)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryAccessTokenRepository {
    tokens: RwLock<HashMap<String, AccessTokenRecord>>,
}

impl InMemoryAccessTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccessTokenRepository for InMemoryAccessTokenRepository {
    async fn find_by_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<AccessTokenRecord>> {
        Ok(self.tokens.read().get(token_hash).cloned())
    }

    async fn insert(&self, record: &AccessTokenRecord) -> Result<()> {
        self.tokens
            .write()
            .insert(record.token_hash.clone(), record.clone());
        Ok(())
    }

    async fn revoke(&self, id: Uuid) -> Result<bool> {
        let mut guard = self.tokens.write();
        match guard
            .values_mut()
            .find(|record| record.id == id && !record.revoked)
        {
            Some(record) => {
                record.revoked = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
