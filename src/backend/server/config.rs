/**
 * Server Configuration
 *
 * This module loads and validates the server configuration: the listen
 * address, the session secret, the store backend and the publish retry
 * policy.
 *
 * # Configuration Sources
 *
 * Configuration is read from environment variables (a `.env` file is loaded
 * first by the binary), with defaults for local development:
 *
 * | Variable                   | Default                     |
 * |----------------------------|-----------------------------|
 * | `SERVER_HOST`              | `0.0.0.0`                   |
 * | `SERVER_PORT`              | `3000`                      |
 * | `JWT_SECRET`               | required                    |
 * | `STORE_BACKEND`            | `memory`                    |
 * | `DATABASE_URL`             | `sqlite://xfchat.db?mode=rwc` |
 * | `UPSTASH_REDIS_REST_URL`   | required for `upstash`      |
 * | `UPSTASH_REDIS_REST_TOKEN` | required for `upstash`      |
 * | `PUBLISH_RETRY_ATTEMPTS`   | `5`                         |
 * | `PUBLISH_RETRY_BASE_MS`    | `500`                       |
 * | `PUBLISH_RETRY_MAX_MS`     | `30000`                     |
 *
 * # Error Handling
 *
 * Unlike optional integrations, the stores are required: a missing secret or
 * an unreachable store is a startup error.
 */

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::backend::messaging::RetryPolicy;
use crate::backend::store::{
    KeyValueStore, MemoryStore, OrderedLog, SqliteStore, StoreError, UpstashStore,
};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DATABASE_URL: &str = "sqlite://xfchat.db?mode=rwc";

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("invalid value for {name}: '{value}'")]
    InvalidValue { name: &'static str, value: String },
    #[error("unknown store backend '{0}' (expected memory, sqlite or upstash)")]
    UnknownBackend(String),
}

/// Where friend sets, profiles and message logs live
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// Process-local maps; data is lost on restart
    Memory,
    Sqlite { database_url: String },
    /// Upstash Redis over its REST API
    Upstash { url: String, token: String },
}

/// Both store seams, usually backed by the same object
pub struct Stores {
    pub kv: Arc<dyn KeyValueStore>,
    pub log: Arc<dyn OrderedLog>,
}

impl StoreBackend {
    /// Connect to the configured backend
    pub async fn connect(&self) -> Result<Stores, StoreError> {
        match self {
            Self::Memory => {
                tracing::warn!("[Store] Using in-memory store; data will not survive a restart");
                let store = Arc::new(MemoryStore::new());
                Ok(Stores {
                    kv: store.clone(),
                    log: store,
                })
            }
            Self::Sqlite { database_url } => {
                tracing::info!("[Store] Connecting to SQLite at {}", database_url);
                let store = Arc::new(SqliteStore::connect(database_url).await?);
                Ok(Stores {
                    kv: store.clone(),
                    log: store,
                })
            }
            Self::Upstash { url, token } => {
                tracing::info!("[Store] Using Upstash REST endpoint {}", url);
                let store = Arc::new(UpstashStore::new(url.clone(), token.clone())?);
                Ok(Stores {
                    kv: store.clone(),
                    log: store,
                })
            }
        }
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub store: StoreBackend,
    pub retry: RetryPolicy,
}

impl ServerConfig {
    /// Create a new ServerConfigBuilder
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, which returns a variable's value
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let store = match var("STORE_BACKEND")
            .unwrap_or_else(|| "memory".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "memory" => StoreBackend::Memory,
            "sqlite" => StoreBackend::Sqlite {
                database_url: var("DATABASE_URL")
                    .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            },
            "upstash" => StoreBackend::Upstash {
                url: var("UPSTASH_REDIS_REST_URL")
                    .ok_or(ConfigError::MissingValue("UPSTASH_REDIS_REST_URL"))?,
                token: var("UPSTASH_REDIS_REST_TOKEN")
                    .ok_or(ConfigError::MissingValue("UPSTASH_REDIS_REST_TOKEN"))?,
            },
            other => return Err(ConfigError::UnknownBackend(other.to_string())),
        };

        let defaults = RetryPolicy::default();
        let max_attempts = parse_var("PUBLISH_RETRY_ATTEMPTS", var("PUBLISH_RETRY_ATTEMPTS"))?
            .unwrap_or(defaults.max_attempts);
        if max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                name: "PUBLISH_RETRY_ATTEMPTS",
                value: "0".to_string(),
            });
        }
        let retry = RetryPolicy {
            max_attempts,
            base_delay: parse_var("PUBLISH_RETRY_BASE_MS", var("PUBLISH_RETRY_BASE_MS"))?
                .map(Duration::from_millis)
                .unwrap_or(defaults.base_delay),
            max_delay: parse_var("PUBLISH_RETRY_MAX_MS", var("PUBLISH_RETRY_MAX_MS"))?
                .map(Duration::from_millis)
                .unwrap_or(defaults.max_delay),
        };

        let mut builder = Self::builder()
            .host(var("SERVER_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()))
            .port(parse_var("SERVER_PORT", var("SERVER_PORT"))?.unwrap_or(DEFAULT_PORT))
            .store(store)
            .retry(retry);
        if let Some(secret) = var("JWT_SECRET") {
            builder = builder.jwt_secret(secret);
        }
        builder.build()
    }

    /// Address the listener binds to
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse().map_err(|_| ConfigError::InvalidValue {
            name: "SERVER_HOST",
            value: self.host.clone(),
        })
    }
}

/// Parse an optional variable, rejecting values that do not parse
fn parse_var<T: FromStr>(name: &'static str, raw: Option<String>) -> Result<Option<T>, ConfigError> {
    raw.map(|value| {
        value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value })
    })
    .transpose()
}

/// Builder for ServerConfig
#[derive(Debug, Default)]
pub struct ServerConfigBuilder {
    host: Option<String>,
    port: Option<u16>,
    jwt_secret: Option<String>,
    store: Option<StoreBackend>,
    retry: Option<RetryPolicy>,
}

impl ServerConfigBuilder {
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.jwt_secret = Some(secret.into());
        self
    }

    pub fn store(mut self, store: StoreBackend) -> Self {
        self.store = Some(store);
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Build the configuration; the JWT secret is the only required value
    pub fn build(self) -> Result<ServerConfig, ConfigError> {
        let jwt_secret = self
            .jwt_secret
            .filter(|secret| !secret.is_empty())
            .ok_or(ConfigError::MissingValue("JWT_SECRET"))?;

        Ok(ServerConfig {
            host: self.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: self.port.unwrap_or(DEFAULT_PORT),
            jwt_secret,
            store: self.store.unwrap_or(StoreBackend::Memory),
            retry: self.retry.unwrap_or_default(),
        })
    }
}
