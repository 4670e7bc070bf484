use thiserror::Error;
use url::Url;

use crate::constants::{MAX_PIN_LENGTH, MIN_PIN_LENGTH};

use super::models::{AuthConfig, Config, CorsConfig, PinAlphabet, PinConfig};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigGuardRailError {
    #[error("authentication secret {field} {reason}")]
    WeakSecret { field: &'static str, reason: String },
    #[error("CORS wildcard origins are not allowed when DEV_MODE is false")]
    DangerousCorsWildcard,
    #[error("invalid CORS configuration: {reason}")]
    InvalidCorsConfig { reason: String },
    #[error("invalid PIN configuration: {reason}")]
    InvalidPinConfig { reason: String },
    #[error("DATABASE_URL must be set when DEV_MODE is false")]
    MissingDatabase,
}

#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn push<S: Into<String>>(&mut self, message: S) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: None,
        });
    }

    pub fn push_with_hint<S: Into<String>, H: Into<String>>(
        &mut self,
        message: S,
        hint: H,
    ) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn extend(&mut self, other: ConfigWarnings) {
        self.items.extend(other.items);
    }

    /// Emit every collected warning through `tracing`.
    pub fn log(&self) {
        for warning in &self.items {
            match &warning.hint {
                Some(hint) => {
                    tracing::warn!(hint = %hint, "{}", warning.message)
                }
                None => tracing::warn!("{}", warning.message),
            }
        }
    }
}

pub fn apply_guard_rails(
    config: &Config,
) -> Result<ConfigWarnings, ConfigGuardRailError> {
    let mut warnings = ConfigWarnings::default();

    if !config.dev_mode {
        enforce_secret(&config.auth)?;
        if config.cors.is_wildcard_included() {
            return Err(ConfigGuardRailError::DangerousCorsWildcard);
        }
        if config.database.primary_url.is_none() {
            return Err(ConfigGuardRailError::MissingDatabase);
        }
    } else {
        if config.auth.is_default_token_key() {
            warnings.push_with_hint(
                "AUTH_TOKEN_KEY uses the development placeholder",
                "Set AUTH_TOKEN_KEY to a random value of at least 32 characters before deploying",
            );
        }
        if config.database.primary_url.is_none() {
            warnings.push_with_hint(
                "DATABASE_URL not configured; PIN accounts are kept in memory and lost on restart",
                "Set DATABASE_URL to persist accounts in Postgres",
            );
        }
    }

    validate_cors(&config.cors)?;
    validate_pins(&config.pins, &mut warnings)?;

    if config.cors.allow_credentials && config.cors.is_wildcard_included() {
        warnings.push(
            "CORS credentials allowed alongside wildcard origin; browsers will reject such configuration",
        );
    }

    Ok(warnings)
}

fn enforce_secret(auth: &AuthConfig) -> Result<(), ConfigGuardRailError> {
    const MIN_SECRET_LENGTH: usize = 32;

    if auth.is_default_token_key() {
        return Err(ConfigGuardRailError::WeakSecret {
            field: "AUTH_TOKEN_KEY",
            reason: "uses the default placeholder value".into(),
        });
    }

    if auth.token_key.len() < MIN_SECRET_LENGTH {
        return Err(ConfigGuardRailError::WeakSecret {
            field: "AUTH_TOKEN_KEY",
            reason: format!("must be at least {MIN_SECRET_LENGTH} characters"),
        });
    }

    Ok(())
}

fn validate_cors(cors: &CorsConfig) -> Result<(), ConfigGuardRailError> {
    for origin in &cors.allowed_origins {
        if origin.trim() == "*" {
            continue;
        }
        Url::parse(origin).map_err(|_| {
            ConfigGuardRailError::InvalidCorsConfig {
                reason: format!(
                    "invalid origin `{origin}` in CORS_ALLOWED_ORIGINS"
                ),
            }
        })?;
    }

    Ok(())
}

fn validate_pins(
    pins: &PinConfig,
    warnings: &mut ConfigWarnings,
) -> Result<(), ConfigGuardRailError> {
    if !(MIN_PIN_LENGTH..=MAX_PIN_LENGTH).contains(&pins.code_length) {
        return Err(ConfigGuardRailError::InvalidPinConfig {
            reason: format!(
                "PIN_CODE_LENGTH must be between {MIN_PIN_LENGTH} and {MAX_PIN_LENGTH}"
            ),
        });
    }

    if pins.max_redraws == 0 {
        return Err(ConfigGuardRailError::InvalidPinConfig {
            reason: "PIN_MAX_REDRAWS must be at least 1".into(),
        });
    }

    if pins.alphabet == PinAlphabet::Numeric && pins.code_length < 8 {
        warnings.push_with_hint(
            format!(
                "numeric PINs of length {} leave a small code space",
                pins.code_length
            ),
            "Raise PIN_CODE_LENGTH or switch PIN_ALPHABET to alphanumeric",
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{DEFAULT_MAX_REDRAWS, DEFAULT_TOKEN_KEY};
    use crate::models::{ConfigMetadata, DatabaseConfig, ServerConfig};

    fn production_config() -> Config {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".into(),
                port: 8096,
            },
            database: DatabaseConfig {
                primary_url: Some("postgres://localhost/turnstile".into()),
            },
            cors: CorsConfig {
                allowed_origins: vec!["https://admin.example.com".into()],
                allow_credentials: false,
            },
            dev_mode: false,
            auth: AuthConfig {
                token_key: "k".repeat(48),
            },
            pins: PinConfig {
                code_length: 10,
                alphabet: PinAlphabet::Numeric,
                max_redraws: DEFAULT_MAX_REDRAWS,
            },
            metadata: ConfigMetadata::default(),
        }
    }

    #[test]
    fn production_config_passes() {
        let warnings = apply_guard_rails(&production_config()).unwrap();
        assert!(warnings.is_empty());
    }

    #[test]
    fn placeholder_token_key_rejected_outside_dev_mode() {
        let mut config = production_config();
        config.auth.token_key = DEFAULT_TOKEN_KEY.into();
        assert!(matches!(
            apply_guard_rails(&config),
            Err(ConfigGuardRailError::WeakSecret { .. })
        ));

        config.dev_mode = true;
        let warnings = apply_guard_rails(&config).unwrap();
        assert!(!warnings.is_empty());
    }

    #[test]
    fn short_token_key_rejected() {
        let mut config = production_config();
        config.auth.token_key = "short".into();
        assert!(matches!(
            apply_guard_rails(&config),
            Err(ConfigGuardRailError::WeakSecret { .. })
        ));
    }

    #[test]
    fn wildcard_cors_rejected_outside_dev_mode() {
        let mut config = production_config();
        config.cors.allowed_origins = vec!["*".into()];
        assert_eq!(
            apply_guard_rails(&config).unwrap_err(),
            ConfigGuardRailError::DangerousCorsWildcard
        );
    }

    #[test]
    fn pin_length_bounds_enforced() {
        let mut config = production_config();
        config.pins.code_length = 5;
        assert!(matches!(
            apply_guard_rails(&config),
            Err(ConfigGuardRailError::InvalidPinConfig { .. })
        ));

        config.pins.code_length = 33;
        assert!(apply_guard_rails(&config).is_err());
    }

    #[test]
    fn zero_redraws_rejected() {
        let mut config = production_config();
        config.pins.max_redraws = 0;
        assert!(apply_guard_rails(&config).is_err());
    }

    #[test]
    fn missing_database_rejected_outside_dev_mode() {
        let mut config = production_config();
        config.database.primary_url = None;
        assert_eq!(
            apply_guard_rails(&config).unwrap_err(),
            ConfigGuardRailError::MissingDatabase
        );
    }
}
