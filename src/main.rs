//! pokecache - Cached PokeAPI listings and detail records
//!
//! Parses configuration, opens the cache store once, and runs a single
//! operation, printing its JSON result on stdout. Failures print a JSON
//! error body on stderr and exit non-zero.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use serde_json::json;
use tracing::error;
use tracing_subscriber::EnvFilter;

use pokecache::cache;
use pokecache::cli::{Cli, Command};
use pokecache::config::AppConfig;
use pokecache::data::PokeApiClient;
use pokecache::error::ErrorBody;
use pokecache::pipeline::Pokedex;

/// Installs a stderr log subscriber filtered by `RUST_LOG` (default `info`)
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Runs one operation, returning its JSON output or an error body
async fn run(pokedex: &Pokedex, command: &Command) -> Result<serde_json::Value, ErrorBody> {
    match *command {
        Command::List { limit, offset } => {
            let listing = pokedex
                .list_pokemon(limit, offset)
                .await
                .map_err(|e| ErrorBody::new("Error fetching data from PokeAPI", &e))?;
            serde_json::to_value(listing).map_err(|e| ErrorBody::new("Error encoding listing", &e))
        }
        Command::Detail { id } => {
            let record = pokedex
                .get_pokemon_detail(id)
                .await
                .map_err(|e| ErrorBody::new(format!("Error fetching details for Pokemon {}", id), &e))?;
            serde_json::to_value(record).map_err(|e| ErrorBody::new("Error encoding record", &e))
        }
        Command::ClearCache => {
            let deleted = pokedex
                .clear_cache()
                .await
                .map_err(|e| ErrorBody::new("Error clearing cache", &e))?;
            Ok(json!({
                "status": "success",
                "message": "Cache cleared",
                "keys_deleted": deleted,
            }))
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();

    let config = match AppConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            eprintln!("{}", ErrorBody::new("Invalid configuration", &e).to_json());
            return ExitCode::from(2);
        }
    };

    let upstream = match PokeApiClient::new(config.api_base_url.clone(), config.timeout) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "failed to build HTTP client");
            eprintln!("{}", ErrorBody::new("Failed to build HTTP client", &e).to_json());
            return ExitCode::from(2);
        }
    };

    let cache = cache::open(&config.store, config.timeout).await;
    let pokedex = Pokedex::new(Arc::new(upstream), cache).with_flavor_language(config.flavor_language);

    match run(&pokedex, &cli.command).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(body) => {
            eprintln!("{}", body.to_json());
            ExitCode::FAILURE
        }
    }
}
