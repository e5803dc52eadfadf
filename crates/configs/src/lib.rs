//! # configs
//!
//! Layered application settings.
//!
//! Loading order (later wins):
//! 1. Built-in defaults
//! 2. `config/forum.toml` (optional)
//! 3. Legacy variables `PORT`, `SECRET_KEY`, `DATABASE_URL`
//! 4. `FORUM_`-prefixed variables, `__` between sections
//!    (e.g. `FORUM_AUTH__TOKEN_TTL_SECS=600`)
//!
//! A `.env` file in the working directory is read first, if present.

use std::path::Path;

use config::{Config, Environment, File, Map};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "config/forum.toml";
const ENV_PREFIX: &str = "FORUM";

/// Legacy variable → (settings key, `FORUM_` variable that takes precedence).
const LEGACY_VARS: [(&str, &str, &str); 3] = [
    ("PORT", "server.port", "FORUM_SERVER__PORT"),
    ("SECRET_KEY", "auth.jwt_secret", "FORUM_AUTH__JWT_SECRET"),
    ("DATABASE_URL", "database.url", "FORUM_DATABASE__URL"),
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub storage: StorageSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
    pub posts: PostSettings,
    pub log: LogSettings,
}

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Deserialize)]
pub struct StorageSettings {
    pub backend: StorageBackend,
}

#[derive(Debug, Deserialize)]
pub struct DatabaseSettings {
    pub url: Option<SecretString>,
    pub max_connections: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AuthSettings {
    pub jwt_secret: SecretString,
    /// Session token lifetime.
    pub token_ttl_secs: i64,
    /// Clock skew tolerated when checking `exp`.
    pub leeway_secs: u64,
    pub password: PasswordSettings,
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PasswordSettings {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

#[derive(Debug, Deserialize)]
pub struct PostSettings {
    /// Record the creator's user id on new posts.
    pub record_author: bool,
}

#[derive(Debug, Deserialize)]
pub struct LogSettings {
    /// `EnvFilter` directive; `RUST_LOG` still wins at runtime.
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Settings {
    /// Loads settings from `.env`, the default file and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        // A missing .env is normal outside development.
        dotenvy::dotenv().ok();
        let env: Map<String, String> = std::env::vars().collect();
        Self::from_sources(Some(Path::new(DEFAULT_CONFIG_FILE)), env)
    }

    /// Builds settings from an optional file and an explicit environment map.
    pub fn from_sources(
        file: Option<&Path>,
        env: Map<String, String>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            .set_default("storage.backend", "postgres")?
            .set_default("database.max_connections", 10)?
            .set_default("auth.token_ttl_secs", 3600)?
            .set_default("auth.leeway_secs", 0)?
            .set_default("auth.password.memory_kib", 19_456)?
            .set_default("auth.password.iterations", 2)?
            .set_default("auth.password.parallelism", 1)?
            .set_default("posts.record_author", true)?
            .set_default("log.filter", "info")?
            .set_default("log.json", false)?;

        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(false));
        }

        for (legacy, key, preferred) in LEGACY_VARS {
            if env.contains_key(preferred) {
                continue;
            }
            builder = builder.set_override_option(key, env.get(legacy).cloned())?;
        }

        let settings: Settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(Some(env)),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.expose_secret().trim().is_empty() {
            return Err(ConfigError::Invalid("auth.jwt_secret must be set".into()));
        }
        if self.auth.token_ttl_secs <= 0 {
            return Err(ConfigError::Invalid(
                "auth.token_ttl_secs must be positive".into(),
            ));
        }
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("server.port must be non-zero".into()));
        }
        if self.storage.backend == StorageBackend::Postgres && self.database.url.is_none() {
            return Err(ConfigError::Invalid(
                "database.url is required for the postgres backend".into(),
            ));
        }
        Ok(())
    }
}
