use std::{fmt, sync::Arc};

use turnstile_config::Config;
use turnstile_core::clock::Clock;
use turnstile_core::domain::auth::{AccessTokenService, AuthenticationResolver};
use turnstile_core::domain::pins::{PinDirectory, PinGenerator};
use turnstile_core::domain::repositories::PinUserRepository;

/// Which store backs the running server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::Postgres => "postgres",
            StoreBackend::Memory => "memory",
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub clock: Arc<dyn Clock>,
    pub users: Arc<dyn PinUserRepository>,
    pub resolver: Arc<AuthenticationResolver>,
    pub generator: Arc<PinGenerator>,
    pub directory: Arc<PinDirectory>,
    pub access_tokens: Arc<AccessTokenService>,
    pub backend: StoreBackend,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("backend", &self.backend)
            .finish_non_exhaustive()
    }
}

impl AppState {
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn users(&self) -> &Arc<dyn PinUserRepository> {
        &self.users
    }

    pub fn resolver(&self) -> &Arc<AuthenticationResolver> {
        &self.resolver
    }

    pub fn generator(&self) -> &Arc<PinGenerator> {
        &self.generator
    }

    pub fn directory(&self) -> &Arc<PinDirectory> {
        &self.directory
    }

    pub fn access_tokens(&self) -> &Arc<AccessTokenService> {
        &self.access_tokens
    }
}
