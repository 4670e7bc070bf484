pub mod sources;

use std::fmt::{self, Display};
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_TOKEN_KEY;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cors: CorsConfig,
    pub dev_mode: bool,
    pub auth: AuthConfig,
    pub pins: PinConfig,
    pub metadata: ConfigMetadata,
}

impl Config {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// `None` runs the server against the in-memory store (dev mode only).
    pub primary_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

impl CorsConfig {
    pub fn is_wildcard_included(&self) -> bool {
        self.allowed_origins
            .iter()
            .any(|origin| origin.trim() == "*")
    }
}

#[derive(Clone)]
pub struct AuthConfig {
    pub token_key: String,
}

impl AuthConfig {
    pub fn is_default_token_key(&self) -> bool {
        self.token_key == DEFAULT_TOKEN_KEY
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token_key", &"<redacted>")
            .finish()
    }
}

/// Character set PIN codes are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PinAlphabet {
    /// Decimal digits only.
    #[default]
    Numeric,
    /// Uppercase letters and digits with look-alike glyphs removed.
    Alphanumeric,
}

impl Display for PinAlphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinAlphabet::Numeric => f.write_str("numeric"),
            PinAlphabet::Alphanumeric => f.write_str("alphanumeric"),
        }
    }
}

impl FromStr for PinAlphabet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "numeric" | "digits" => Ok(PinAlphabet::Numeric),
            "alphanumeric" => Ok(PinAlphabet::Alphanumeric),
            other => Err(format!("unknown PIN alphabet `{other}`")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PinConfig {
    pub code_length: usize,
    pub alphabet: PinAlphabet,
    pub max_redraws: u32,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigMetadata {
    pub config_path: Option<PathBuf>,
    pub env_file_loaded: bool,
}
