/// Placeholder HMAC key used when no token key is configured. Rejected by the
/// guard rails outside dev mode.
pub const DEFAULT_TOKEN_KEY: &str = "turnstile-insecure-dev-token-key";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8096;

pub const DEFAULT_PIN_LENGTH: usize = 10;
pub const MIN_PIN_LENGTH: usize = 6;
pub const MAX_PIN_LENGTH: usize = 32;

/// Redraws allowed per batch slot before generation gives up.
pub const DEFAULT_MAX_REDRAWS: u32 = 16;

pub const DEFAULT_CONFIG_FILE: &str = "turnstile.toml";
