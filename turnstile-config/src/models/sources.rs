use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::util::{parse_bool_var, parse_csv_var, parse_var};

use super::PinAlphabet;

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FileConfig {
    #[serde(default)]
    pub server: FileServerConfig,
    #[serde(default)]
    pub database: FileDatabaseConfig,
    #[serde(default)]
    pub cors: FileCorsConfig,
    #[serde(default)]
    pub auth: FileAuthConfig,
    #[serde(default)]
    pub pins: FilePinConfig,
    pub dev_mode: Option<bool>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileDatabaseConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileCorsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_origins: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_credentials: Option<bool>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileAuthConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_key: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FilePinConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alphabet: Option<PinAlphabet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_redraws: Option<u32>,
}

/// Environment-derived configuration values.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub server_host: Option<String>,
    pub server_port: Option<u16>,
    pub database_url: Option<String>,
    pub database_url_file: Option<PathBuf>,
    pub cors_allowed_origins: Option<Vec<String>>,
    pub cors_allow_credentials: Option<bool>,
    pub dev_mode: Option<bool>,
    pub auth_token_key: Option<String>,
    pub pin_code_length: Option<usize>,
    pub pin_alphabet: Option<PinAlphabet>,
    pub pin_max_redraws: Option<u32>,
}

impl EnvConfig {
    pub fn gather() -> Self {
        Self {
            config_path: std::env::var("TURNSTILE_CONFIG")
                .ok()
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from),
            server_host: std::env::var("SERVER_HOST").ok(),
            server_port: parse_var("SERVER_PORT"),
            database_url: std::env::var("DATABASE_URL").ok(),
            database_url_file: std::env::var("DATABASE_URL_FILE")
                .ok()
                .map(PathBuf::from),
            cors_allowed_origins: parse_csv_var("CORS_ALLOWED_ORIGINS"),
            cors_allow_credentials: parse_bool_var("CORS_ALLOW_CREDENTIALS"),
            dev_mode: parse_bool_var("DEV_MODE"),
            auth_token_key: std::env::var("AUTH_TOKEN_KEY")
                .ok()
                .filter(|value| !value.trim().is_empty()),
            pin_code_length: parse_var("PIN_CODE_LENGTH"),
            pin_alphabet: parse_var("PIN_ALPHABET"),
            pin_max_redraws: parse_var("PIN_MAX_REDRAWS"),
        }
    }
}
