//! Configuration loading for the Turnstile server.
//!
//! Environment variables (including those loaded from `.env`) override the
//! optional `turnstile.toml`. The composed
//! [`Config`] is checked by [`validation::apply_guard_rails`] before it is
//! handed to the server.
#![allow(missing_docs)]

pub mod constants;
pub mod loader;
pub mod models;
pub mod util;
pub mod validation;

pub use loader::{ConfigLoad, ConfigLoadError, ConfigLoader, ConfigLoaderOptions};
pub use models::{
    AuthConfig, Config, ConfigMetadata, CorsConfig, DatabaseConfig,
    PinAlphabet, PinConfig, ServerConfig,
};
pub use validation::{
    ConfigGuardRailError, ConfigWarning, ConfigWarnings, apply_guard_rails,
};
