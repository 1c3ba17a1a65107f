//! # configs
//!
//! Layered settings: built-in defaults, then an optional
//! `config/linkboard.{toml,yaml,json}`, then `LINKBOARD__SECTION__KEY`
//! environment variables. `.env` is read first when present.

use std::time::Duration;

use config::{Config, ConfigBuilder, Environment, File};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    Memory,
    Redis,
}

/// Which credential the API accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    Bearer,
    Cookie,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub storage: StorageSettings,
    pub sessions: SessionSettings,
    pub auth: AuthSettings,
    pub log: LogSettings,
}

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    #[serde(default, deserialize_with = "optional_secret")]
    pub database_url: Option<SecretString>,
    pub max_connections: u32,
    pub op_timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct SessionSettings {
    pub backend: SessionBackend,
    #[serde(default, deserialize_with = "optional_secret")]
    pub redis_url: Option<SecretString>,
    pub ttl_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct AuthSettings {
    pub mode: AuthMode,
    #[serde(default = "empty_secret", deserialize_with = "secret")]
    pub jwt_secret: SecretString,
    pub token_ttl_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct LogSettings {
    pub filter: String,
    pub json: bool,
}

impl ServerSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl StorageSettings {
    pub fn op_timeout(&self) -> Duration {
        Duration::from_secs(self.op_timeout_secs)
    }
}

impl SessionSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl AuthSettings {
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }
}

impl Settings {
    /// Reads `.env`, the optional config file and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "loaded .env");
        }
        let builder = defaults()?
            .add_source(File::with_name("config/linkboard").required(false))
            .add_source(
                Environment::with_prefix("LINKBOARD")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );
        Self::from_builder(builder)
    }

    /// Defaults overlaid with a single in-memory TOML document.
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        Self::from_builder(defaults()?.add_source(File::from_str(source, config::FileFormat::Toml)))
    }

    fn from_builder(builder: ConfigBuilder<config::builder::DefaultState>) -> Result<Self, ConfigError> {
        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.expose_secret().trim().is_empty() {
            return Err(ConfigError::Invalid("auth.jwt_secret must be set".into()));
        }
        if self.storage.backend == StorageBackend::Postgres && self.storage.database_url.is_none() {
            return Err(ConfigError::Invalid(
                "storage.database_url is required for the postgres backend".into(),
            ));
        }
        if self.sessions.backend == SessionBackend::Redis && self.sessions.redis_url.is_none() {
            return Err(ConfigError::Invalid(
                "sessions.redis_url is required for the redis backend".into(),
            ));
        }
        if self.storage.max_connections == 0 {
            return Err(ConfigError::Invalid("storage.max_connections must be positive".into()));
        }
        if self.sessions.ttl_secs == 0 || self.auth.token_ttl_secs == 0 {
            return Err(ConfigError::Invalid("lifetimes must be positive".into()));
        }
        Ok(())
    }
}

fn defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError> {
    Ok(Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8080)?
        .set_default("storage.backend", "memory")?
        .set_default("storage.max_connections", 10)?
        .set_default("storage.op_timeout_secs", 5)?
        .set_default("sessions.backend", "memory")?
        .set_default("sessions.ttl_secs", 1800)?
        .set_default("auth.mode", "bearer")?
        .set_default("auth.token_ttl_secs", 86_400)?
        .set_default("log.filter", "info")?
        .set_default("log.json", false)?)
}

fn empty_secret() -> SecretString {
    SecretString::from(String::new())
}

fn secret<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SecretString, D::Error> {
    String::deserialize(deserializer).map(SecretString::from)
}

fn optional_secret<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<SecretString>, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?
        .filter(|raw| !raw.is_empty())
        .map(SecretString::from))
}
