#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use turnstile_core::clock::{Clock, FixedClock};
use turnstile_core::domain::auth::value_objects::PinCode;
use turnstile_core::domain::auth::{
    AccessTokenService, AuthCrypto, AuthenticationResolver,
    StoredTokenAuthenticator,
};
use turnstile_core::domain::pins::{
    CodeSource, OsCodeSource, PinDirectory, PinGenerator, PinPolicy,
};
use turnstile_core::domain::repositories::PinUserRepository;
use turnstile_core::domain::users::User;
use turnstile_core::error::{GenerationError, Result as StoreResult, StoreError};
use turnstile_core::infrastructure::{
    InMemoryAccessTokenRepository, InMemoryPinUserRepository,
};
use turnstile_model::SubscriptionType;
use uuid::Uuid;

pub const TEST_TOKEN_KEY: &str = "test-token-key-with-enough-length-0001";

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
}

/// Code source that replays a fixed script, then falls back to the OS RNG.
#[derive(Debug, Default)]
pub struct ScriptedCodeSource {
    script: Mutex<VecDeque<String>>,
}

impl ScriptedCodeSource {
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: Mutex::new(codes.into_iter().map(Into::into).collect()),
        }
    }

    pub fn remaining(&self) -> usize {
        self.script.lock().len()
    }
}

impl CodeSource for ScriptedCodeSource {
    fn draw(&self, policy: &PinPolicy) -> Result<PinCode, GenerationError> {
        match self.script.lock().pop_front() {
            Some(code) => {
                Ok(PinCode::parse(&code).expect("scripted codes are non-empty"))
            }
            None => OsCodeSource.draw(policy),
        }
    }
}

/// Code source that always returns the same value.
#[derive(Debug)]
pub struct ConstantCodeSource(pub &'static str);

impl CodeSource for ConstantCodeSource {
    fn draw(&self, _policy: &PinPolicy) -> Result<PinCode, GenerationError> {
        Ok(PinCode::parse(self.0).expect("constant code is non-empty"))
    }
}

/// Wraps a repository and makes the first `failures` batch inserts lose a
/// uniqueness race on `contested`.
pub struct RacingRepository {
    inner: Arc<InMemoryPinUserRepository>,
    contested: String,
    failures: AtomicUsize,
}

impl RacingRepository {
    pub fn new(
        inner: Arc<InMemoryPinUserRepository>,
        contested: &str,
        failures: usize,
    ) -> Self {
        Self {
            inner,
            contested: contested.to_string(),
            failures: AtomicUsize::new(failures),
        }
    }
}

#[async_trait]
impl PinUserRepository for RacingRepository {
    async fn ping(&self) -> StoreResult<()> {
        self.inner.ping().await
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_pin(&self, pin: &str) -> StoreResult<Option<User>> {
        self.inner.find_by_pin(pin).await
    }

    async fn existing_pins(
        &self,
        candidates: &[String],
    ) -> StoreResult<HashSet<String>> {
        self.inner.existing_pins(candidates).await
    }

    async fn insert_batch(&self, users: &[User]) -> StoreResult<()> {
        let contains_contested = users
            .iter()
            .any(|user| user.pin_code.as_deref() == Some(self.contested.as_str()));
        if contains_contested
            && self
                .failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
        {
            return Err(StoreError::DuplicatePin(vec![self.contested.clone()]));
        }
        self.inner.insert_batch(users).await
    }

    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        self.inner.insert_user(user).await
    }

    async fn list_pin_users(
        &self,
        tier: Option<SubscriptionType>,
    ) -> StoreResult<Vec<User>> {
        self.inner.list_pin_users(tier).await
    }
}

/// Repository whose every call fails as if the database were down.
#[derive(Debug, Default)]
pub struct UnavailableRepository;

fn down() -> StoreError {
    StoreError::Unavailable(anyhow::anyhow!("connection refused"))
}

#[async_trait]
impl PinUserRepository for UnavailableRepository {
    async fn ping(&self) -> StoreResult<()> {
        Err(down())
    }

    async fn find_by_id(&self, _id: Uuid) -> StoreResult<Option<User>> {
        Err(down())
    }

    async fn find_by_pin(&self, _pin: &str) -> StoreResult<Option<User>> {
        Err(down())
    }

    async fn existing_pins(
        &self,
        _candidates: &[String],
    ) -> StoreResult<HashSet<String>> {
        Err(down())
    }

    async fn insert_batch(&self, _users: &[User]) -> StoreResult<()> {
        Err(down())
    }

    async fn insert_user(&self, _user: &User) -> StoreResult<()> {
        Err(down())
    }

    async fn list_pin_users(
        &self,
        _tier: Option<SubscriptionType>,
    ) -> StoreResult<Vec<User>> {
        Err(down())
    }
}

/// In-memory wiring of every core service around one fixed clock.
pub struct Harness {
    pub clock: Arc<FixedClock>,
    pub users: Arc<InMemoryPinUserRepository>,
    pub tokens: Arc<InMemoryAccessTokenRepository>,
    pub crypto: Arc<AuthCrypto>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            clock: Arc::new(FixedClock::new(t0())),
            users: Arc::new(InMemoryPinUserRepository::new()),
            tokens: Arc::new(InMemoryAccessTokenRepository::new()),
            crypto: Arc::new(AuthCrypto::new(TEST_TOKEN_KEY).unwrap()),
        }
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        self.clock.clone()
    }

    pub fn generator(&self) -> PinGenerator {
        self.generator_with(Arc::new(OsCodeSource), PinPolicy::default())
    }

    pub fn generator_with(
        &self,
        source: Arc<dyn CodeSource>,
        policy: PinPolicy,
    ) -> PinGenerator {
        PinGenerator::new(self.users.clone(), source, self.clock(), policy)
    }

    pub fn directory(&self) -> PinDirectory {
        PinDirectory::new(self.users.clone(), self.clock())
    }

    pub fn access_tokens(&self) -> AccessTokenService {
        AccessTokenService::new(
            self.tokens.clone(),
            self.crypto.clone(),
            self.clock(),
        )
    }

    pub fn resolver(&self) -> AuthenticationResolver {
        let authenticator = StoredTokenAuthenticator::new(
            self.tokens.clone(),
            self.users.clone(),
            self.crypto.clone(),
            self.clock(),
        );
        AuthenticationResolver::new(
            self.users.clone(),
            Arc::new(authenticator),
            self.clock(),
        )
    }

    /// Insert a non-PIN account directly.
    pub async fn create_account(&self, username: &str, admin: bool) -> User {
        let user = User {
            id: Uuid::now_v7(),
            username: username.to_string(),
            is_administrator: admin,
            pin_code: None,
            subscription_type: SubscriptionType::None,
            expiration_date: None,
            created_at: self.clock.now(),
        };
        self.users.insert_user(&user).await.unwrap();
        user
    }
}
