#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use axum::http::{HeaderName, HeaderValue};
use axum_test::TestServer;
use chrono::{DateTime, TimeZone, Utc};
use turnstile_config::{
    AuthConfig, Config, ConfigMetadata, CorsConfig, DatabaseConfig,
    PinAlphabet, PinConfig, ServerConfig,
};
use turnstile_core::clock::{Clock, FixedClock};
use turnstile_core::domain::auth::DeviceClaims;
use turnstile_core::domain::repositories::PinUserRepository;
use turnstile_core::domain::users::User;
use turnstile_core::error::{Result as StoreResult, StoreError};
use turnstile_core::infrastructure::InMemoryAccessTokenRepository;
use turnstile_model::SubscriptionType;
use turnstile_server::{
    AppState, create_app,
    infra::{
        app_state::StoreBackend,
        startup::{Stores, build_state},
    },
};
use uuid::Uuid;

pub const TEST_TOKEN_KEY: &str = "integration-test-token-key-0123456789";

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
}

pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
        },
        database: DatabaseConfig { primary_url: None },
        cors: CorsConfig {
            allowed_origins: vec![],
            allow_credentials: false,
        },
        dev_mode: true,
        auth: AuthConfig {
            token_key: TEST_TOKEN_KEY.into(),
        },
        pins: PinConfig {
            code_length: 10,
            alphabet: PinAlphabet::Numeric,
            max_redraws: 16,
        },
        metadata: ConfigMetadata::default(),
    }
}

/// Header pair for `add_header`.
pub fn header(name: &'static str, value: &str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static(name),
        HeaderValue::from_str(value).expect("valid header value"),
    )
}

// Code is used by test modules, but not in this scope
#[allow(unused)]
pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub clock: Arc<FixedClock>,
}

#[allow(unused)]
impl TestApp {
    /// Issue PINs directly through the generator, bypassing HTTP.
    pub async fn issue_pins(
        &self,
        count: i32,
        tier: SubscriptionType,
    ) -> Result<Vec<String>> {
        Ok(self.state.generator().generate(count, tier).await?)
    }

    pub async fn api_key(&self) -> Result<String> {
        let issued = self.state.access_tokens().issue_api_key("tests").await?;
        Ok(issued.token.as_str().to_string())
    }

    /// Create a non-PIN account and return a token bound to it.
    pub async fn account_token(
        &self,
        username: &str,
        is_administrator: bool,
    ) -> Result<(Uuid, String)> {
        let user = User {
            id: Uuid::now_v7(),
            username: username.to_string(),
            is_administrator,
            pin_code: None,
            subscription_type: SubscriptionType::None,
            expiration_date: None,
            created_at: self.clock.now(),
        };
        self.state.users().insert_user(&user).await?;
        let issued = self
            .state
            .access_tokens()
            .issue_for_user(user.id, DeviceClaims::default())
            .await?;
        Ok((issued.id, issued.token.as_str().to_string()))
    }
}

#[allow(unused)]
pub fn build_test_app() -> Result<TestApp> {
    build_test_app_with(Stores::in_memory())
}

pub fn build_test_app_with(stores: Stores) -> Result<TestApp> {
    let clock = Arc::new(FixedClock::new(t0()));
    let state = build_state(Arc::new(test_config()), stores, clock.clone())?;
    let server = TestServer::new(create_app(state.clone()))
        .map_err(|err| anyhow!(err.to_string()))?;

    Ok(TestApp {
        server,
        state,
        clock,
    })
}

/// User store that fails every call as if the database were unreachable.
pub struct DownUserStore;

fn down() -> StoreError {
    StoreError::Unavailable(anyhow!("connection refused"))
}

#[async_trait]
impl PinUserRepository for DownUserStore {
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

pub fn unreachable_stores() -> Stores {
    Stores {
        users: Arc::new(DownUserStore),
        tokens: Arc::new(InMemoryAccessTokenRepository::new()),
        backend: StoreBackend::Postgres,
    }
}
