use std::{fmt, sync::Arc, time::Duration};

use anyhow::{Context, anyhow};
use sqlx::{PgPool, postgres::PgPoolOptions};
use tracing::{info, warn};
use turnstile_config::{Config, PinAlphabet, PinConfig};
use turnstile_core::clock::Clock;
use turnstile_core::domain::auth::{
    AccessTokenService, AuthCrypto, AuthenticationResolver,
    StoredTokenAuthenticator,
};
use turnstile_core::domain::pins::{
    CodeAlphabet, OsCodeSource, PinDirectory, PinGenerator, PinPolicy,
};
use turnstile_core::domain::repositories::{
    AccessTokenRepository, PinUserRepository,
};
use turnstile_core::infrastructure::{
    InMemoryAccessTokenRepository, InMemoryPinUserRepository,
    PostgresAccessTokenRepository, PostgresPinUserRepository,
};

use super::app_state::{AppState, StoreBackend};

const MAX_DB_CONNECTIONS: u32 = 10;
const DB_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// User and token stores the services are wired against.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn PinUserRepository>,
    pub tokens: Arc<dyn AccessTokenRepository>,
    pub backend: StoreBackend,
}

impl fmt::Debug for Stores {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stores")
            .field("backend", &self.backend)
            .finish_non_exhaustive()
    }
}

impl Stores {
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryPinUserRepository::new()),
            tokens: Arc::new(InMemoryAccessTokenRepository::new()),
            backend: StoreBackend::Memory,
        }
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PostgresPinUserRepository::new(pool.clone())),
            tokens: Arc::new(PostgresAccessTokenRepository::new(pool)),
            backend: StoreBackend::Postgres,
        }
    }

    /// Connect to Postgres and apply migrations, or fall back to the
    /// in-memory stores in dev mode when no database is configured.
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        match config.database.primary_url.as_deref() {
            Some(url) => {
                let pool = connect_postgres(url).await?;
                migrate(&pool).await?;
                Ok(Self::postgres(pool))
            }
            None if config.dev_mode => {
                warn!(
                    "no DATABASE_URL configured; using in-memory stores (data is lost on restart)"
                );
                Ok(Self::in_memory())
            }
            None => Err(anyhow!(
                "DATABASE_URL must be provided outside dev mode"
            )),
        }
    }
}

pub async fn connect_postgres(url: &str) -> anyhow::Result<PgPool> {
    if !(url.starts_with("postgres://") || url.starts_with("postgresql://")) {
        return Err(anyhow!(
            "Invalid database URL: must start with postgres:// or postgresql://"
        ));
    }

    let pool = PgPoolOptions::new()
        .max_connections(MAX_DB_CONNECTIONS)
        .acquire_timeout(DB_ACQUIRE_TIMEOUT)
        .connect(url)
        .await
        .context("failed to connect to PostgreSQL")?;
    info!("Successfully connected to PostgreSQL");
    Ok(pool)
}

pub async fn migrate(pool: &PgPool) -> anyhow::Result<()> {
    turnstile_core::MIGRATOR
        .run(pool)
        .await
        .context("database migration failed")?;
    info!("Database schema initialized successfully");
    Ok(())
}

pub fn pin_policy(config: &PinConfig) -> PinPolicy {
    PinPolicy {
        length: config.code_length,
        alphabet: match config.alphabet {
            PinAlphabet::Numeric => CodeAlphabet::Numeric,
            PinAlphabet::Alphanumeric => CodeAlphabet::Alphanumeric,
        },
        max_redraws: config.max_redraws,
    }
}

pub fn token_crypto(config: &Config) -> anyhow::Result<Arc<AuthCrypto>> {
    let crypto = AuthCrypto::new(&config.auth.token_key)
        .context("failed to initialise token crypto")?;
    Ok(Arc::new(crypto))
}

/// Wire every service over `stores` into one [`AppState`].
pub fn build_state(
    config: Arc<Config>,
    stores: Stores,
    clock: Arc<dyn Clock>,
) -> anyhow::Result<AppState> {
    let crypto = token_crypto(&config)?;
    let policy = pin_policy(&config.pins);

    let authenticator = StoredTokenAuthenticator::new(
        stores.tokens.clone(),
        stores.users.clone(),
        crypto.clone(),
        clock.clone(),
    );
    let resolver = AuthenticationResolver::new(
        stores.users.clone(),
        Arc::new(authenticator),
        clock.clone(),
    );
    let generator = PinGenerator::new(
        stores.users.clone(),
        Arc::new(OsCodeSource),
        clock.clone(),
        policy,
    );
    let directory = PinDirectory::new(stores.users.clone(), clock.clone());
    let access_tokens =
        AccessTokenService::new(stores.tokens.clone(), crypto, clock.clone());

    info!(
        backend = stores.backend.as_str(),
        pin.length = config.pins.code_length,
        pin.alphabet = %config.pins.alphabet,
        pin.max_redraws = config.pins.max_redraws,
        "services wired"
    );

    Ok(AppState {
        config,
        clock,
        users: stores.users,
        resolver: Arc::new(resolver),
        generator: Arc::new(generator),
        directory: Arc::new(directory),
        access_tokens: Arc::new(access_tokens),
        backend: stores.backend,
    })
}
