//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use chat_core::{ModelPicker, RandomPicker, RoundRobinPicker};
use orchestrator::{SelectionMode, StrategyChoice, UnknownOption, DEFAULT_REQUEST_TIMEOUT};
use providers::{ResolverMode, TransportSettings};

/// How `CORS_ORIGINS` was set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsOrigins {
    Any,
    List(Vec<String>),
}

/// Model rotation used by providers that list several models.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    Random,
    RoundRobin,
}

impl Rotation {
    pub fn picker(self) -> Arc<dyn ModelPicker> {
        match self {
            Rotation::Random => Arc::new(RandomPicker),
            Rotation::RoundRobin => Arc::new(RoundRobinPicker::new()),
        }
    }
}

/// Chat server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// SQLite database URL.
    pub database_url: String,
    /// Whether chat transactions are stored at all.
    pub persistence_enabled: bool,
    pub cors_origins: CorsOrigins,
    pub strategy: StrategyChoice,
    pub selection: SelectionMode,
    /// Overall deadline for one chat request.
    pub request_timeout: Duration,
    pub rotation: Rotation,
    /// Outbound connection settings for provider calls.
    pub transport: TransportSettings,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `API_ADDR` | Server bind address | `127.0.0.1:8001` |
    /// | `SQLITE_PATH` | SQLite database URL | `sqlite:chat.db?mode=rwc` |
    /// | `PERSISTENCE_ENABLED` | `false` turns the transaction log off | `true` |
    /// | `CORS_ORIGINS` | Comma-separated origins, `*` for any | `*` |
    /// | `CHAT_STRATEGY` | `auto`, `parallel`, `sequential` or `local` | `auto` |
    /// | `CHAT_SELECTION` | `first` or `concatenate` | `first` |
    /// | `CHAT_REQUEST_TIMEOUT_SECS` | Overall dispatch deadline | `50` |
    /// | `MODEL_ROTATION` | `random` or `round-robin` | `random` |
    /// | `HTTP_MAX_CONNECTIONS_PER_HOST` | In-flight cap per provider host | `30` |
    /// | `DNS_CACHE_TTL_SECS` | Resolver cache TTL, `0` for system lookups only | `300` |
    ///
    /// Provider credentials and models are read separately by
    /// [`providers::ProviderRegistry::from_env`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let addr = var("API_ADDR")
            .unwrap_or_else(|| "127.0.0.1:8001".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let database_url =
            var("SQLITE_PATH").unwrap_or_else(|| "sqlite:chat.db?mode=rwc".to_string());

        let persistence_enabled = match var("PERSISTENCE_ENABLED") {
            Some(value) => parse_bool("PERSISTENCE_ENABLED", &value)?,
            None => true,
        };

        let cors_origins = match var("CORS_ORIGINS") {
            None => CorsOrigins::Any,
            Some(value) if value == "*" => CorsOrigins::Any,
            Some(value) => CorsOrigins::List(
                value
                    .split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect(),
            ),
        };

        let strategy = match var("CHAT_STRATEGY") {
            Some(value) => value.parse()?,
            None => StrategyChoice::default(),
        };

        let selection = match var("CHAT_SELECTION") {
            Some(value) => value.parse()?,
            None => SelectionMode::default(),
        };

        let request_timeout = match var("CHAT_REQUEST_TIMEOUT_SECS") {
            Some(value) => Duration::from_secs(parse_number("CHAT_REQUEST_TIMEOUT_SECS", &value)?),
            None => DEFAULT_REQUEST_TIMEOUT,
        };

        let rotation = match var("MODEL_ROTATION").map(|v| v.to_ascii_lowercase()).as_deref() {
            None | Some("random") => Rotation::Random,
            Some("round-robin") | Some("round_robin") => Rotation::RoundRobin,
            Some(other) => {
                return Err(UnknownOption {
                    kind: "model rotation",
                    value: other.to_string(),
                }
                .into())
            }
        };

        let mut transport = TransportSettings::default();
        if let Some(value) = var("HTTP_MAX_CONNECTIONS_PER_HOST") {
            let max = parse_number("HTTP_MAX_CONNECTIONS_PER_HOST", &value)?;
            if max == 0 {
                return Err(ConfigError::InvalidValue {
                    key: "HTTP_MAX_CONNECTIONS_PER_HOST",
                    value,
                });
            }
            transport.max_connections_per_host = max as usize;
        }
        if let Some(value) = var("DNS_CACHE_TTL_SECS") {
            transport.resolver =
                ResolverMode::from_ttl_secs(parse_number("DNS_CACHE_TTL_SECS", &value)?);
        }

        Ok(Self {
            addr,
            database_url,
            persistence_enabled,
            cors_origins,
            strategy,
            selection,
            request_timeout,
            rotation,
            transport,
        })
    }
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
        }),
    }
}

fn parse_number(key: &'static str, value: &str) -> Result<u64, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid API_ADDR format")]
    InvalidAddr,

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error(transparent)]
    UnknownOption(#[from] UnknownOption),
}
