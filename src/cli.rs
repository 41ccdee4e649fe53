//! Command-line interface parsing for pokecache
//!
//! This module handles parsing of CLI arguments using clap. Every setting can
//! also come from the environment, so the binary runs unchanged under a
//! process manager that only sets env vars.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::DEFAULT_REDIS_PORT;
use crate::data::DEFAULT_API_BASE_URL;
use crate::pipeline::DEFAULT_FLAVOR_LANGUAGE;

/// pokecache - Cached PokeAPI listings and detail records
#[derive(Parser, Debug)]
#[command(name = "pokecache")]
#[command(about = "Cached PokeAPI listings and detail records")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Base URL of the upstream API
    #[arg(long, env = "POKEAPI_BASE_URL", default_value = DEFAULT_API_BASE_URL, global = true)]
    pub api_base_url: String,

    /// Connect/read timeout in seconds for each upstream and store call
    #[arg(long, env = "POKECACHE_TIMEOUT_SECS", default_value_t = 15, global = true)]
    pub timeout_secs: u64,

    /// Language tag used to pick the species flavor text
    #[arg(long, env = "POKECACHE_FLAVOR_LANGUAGE", default_value = DEFAULT_FLAVOR_LANGUAGE, global = true)]
    pub flavor_language: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Cache store selection
#[derive(Args, Debug, Clone, Default)]
pub struct StoreArgs {
    /// Redis host name
    #[arg(long, env = "REDIS_HOST", global = true)]
    pub redis_host: Option<String>,

    /// Redis port
    #[arg(long, env = "REDIS_PORT", default_value_t = DEFAULT_REDIS_PORT, global = true)]
    pub redis_port: u16,

    /// Redis password
    #[arg(long, env = "REDIS_PASSWORD", hide_env_values = true, global = true)]
    pub redis_password: Option<String>,

    /// Connect to Redis over TLS
    #[arg(long, env = "REDIS_TLS", global = true)]
    pub redis_tls: bool,

    /// Redis connection string: host:port[,password=...][,ssl=true]
    #[arg(long, env = "REDIS_CONNECTION_STRING", hide_env_values = true, global = true)]
    pub redis_connection_string: Option<String>,

    /// Use a local directory as the cache store
    #[arg(long, env = "POKECACHE_CACHE_DIR", value_name = "DIR", global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Use the default per-user cache directory as the cache store
    #[arg(long, env = "POKECACHE_DISK_CACHE", global = true)]
    pub disk_cache: bool,
}

/// Operations exposed by the binary
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List a page of Pokemon with their basic records
    List {
        /// Page size
        #[arg(long, default_value_t = 20)]
        limit: u32,
        /// Index of the first entry
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
    /// Show the full record for one Pokemon
    Detail {
        /// Pokemon id
        id: u32,
    },
    /// Delete every cache entry in the pokemon namespace
    ClearCache,
}
