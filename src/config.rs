//! Startup configuration
//!
//! Built once from parsed CLI arguments (which fall back to environment
//! variables) and validated before anything touches the network. Every
//! error here is fatal at startup.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::cli::Cli;

/// Default Redis port
pub const DEFAULT_REDIS_PORT: u16 = 6379;

/// Errors in the startup configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The connection string does not start with `host:port`
    #[error("Invalid Redis address '{0}': expected host:port")]
    InvalidAddress(String),

    /// The port is not a number in 1..=65535
    #[error("Invalid Redis port '{0}'")]
    InvalidPort(String),

    /// The upstream base URL is not an http(s) URL
    #[error("Invalid API base URL '{0}': expected http:// or https://")]
    InvalidBaseUrl(String),

    /// The upstream timeout must be at least one second
    #[error("Timeout must be at least 1 second")]
    InvalidTimeout,

    /// The flavor text language tag is empty
    #[error("Flavor text language must not be empty")]
    EmptyLanguage,
}

/// Connection settings for a Redis cache store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
    pub use_tls: bool,
}

impl RedisConfig {
    /// Parses the `host:port[,password=...][,ssl=true]` connection string form
    ///
    /// Options other than `password` and `ssl` are ignored.
    pub fn parse_connection_string(s: &str) -> Result<Self, ConfigError> {
        let mut parts = s.split(',');
        let address = parts.next().unwrap_or_default().trim();

        let (host, port) = address
            .split_once(':')
            .filter(|(host, port)| !host.is_empty() && !port.contains(':'))
            .ok_or_else(|| ConfigError::InvalidAddress(address.to_string()))?;
        let port = parse_port(port)?;

        let mut config = Self {
            host: host.to_string(),
            port,
            password: None,
            use_tls: false,
        };

        for option in parts {
            let option = option.trim();
            if let Some(password) = option.strip_prefix("password=") {
                config.password = Some(password.to_string());
            } else if let Some(ssl) = option.strip_prefix("ssl=") {
                config.use_tls = ssl.eq_ignore_ascii_case("true");
            }
        }

        Ok(config)
    }
}

fn parse_port(port: &str) -> Result<u16, ConfigError> {
    match port.trim().parse::<u16>() {
        Ok(port) if port != 0 => Ok(port),
        _ => Err(ConfigError::InvalidPort(port.to_string())),
    }
}

/// Which cache backend to use
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    /// A Redis server
    Redis(RedisConfig),
    /// A local directory; `None` means the default XDG cache directory
    Disk(Option<PathBuf>),
    /// No store; caching is disabled
    None,
}

/// Validated application configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub api_base_url: String,
    /// Per-call timeout for upstream and store operations
    pub timeout: Duration,
    /// Language tag used to pick species flavor text
    pub flavor_language: String,
}

impl AppConfig {
    /// Creates an AppConfig from parsed CLI arguments
    ///
    /// Store selection order: an explicit cache directory or `--disk-cache`,
    /// then a Redis connection string, then a Redis host. With none of them
    /// caching is disabled.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let store = if cli.store.cache_dir.is_some() || cli.store.disk_cache {
            StoreConfig::Disk(cli.store.cache_dir.clone())
        } else if let Some(connection_string) = &cli.store.redis_connection_string {
            StoreConfig::Redis(RedisConfig::parse_connection_string(connection_string)?)
        } else if let Some(host) = &cli.store.redis_host {
            if host.trim().is_empty() {
                return Err(ConfigError::InvalidAddress(host.clone()));
            }
            if cli.store.redis_port == 0 {
                return Err(ConfigError::InvalidPort("0".to_string()));
            }
            StoreConfig::Redis(RedisConfig {
                host: host.trim().to_string(),
                port: cli.store.redis_port,
                password: cli.store.redis_password.clone(),
                use_tls: cli.store.redis_tls,
            })
        } else {
            StoreConfig::None
        };

        let api_base_url = cli.api_base_url.trim_end_matches('/').to_string();
        if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(cli.api_base_url.clone()));
        }

        if cli.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }

        let flavor_language = cli.flavor_language.trim().to_string();
        if flavor_language.is_empty() {
            return Err(ConfigError::EmptyLanguage);
        }

        Ok(Self {
            store,
            api_base_url,
            timeout: Duration::from_secs(cli.timeout_secs),
            flavor_language,
        })
    }
}
