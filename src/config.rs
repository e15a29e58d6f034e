use std::env;
use std::net::SocketAddr;

use thiserror::Error;

use crate::openai::{DEFAULT_BASE_URL, DEFAULT_MODEL, OpenAiConfig};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://taskboard.db?mode=rwc";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:4321";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid BIND_ADDR '{0}'")]
    InvalidBindAddr(String),
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    /// `None` when no API key is set; description generation is then disabled.
    pub openai: Option<OpenAiConfig>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let raw_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw_addr
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidBindAddr(raw_addr.clone()))?;

        let openai = lookup("OPENAI_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .map(|api_key| OpenAiConfig {
                api_key,
                base_url: lookup("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                model: lookup("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            });

        Ok(Self {
            database_url,
            bind_addr,
            openai,
        })
    }
}
