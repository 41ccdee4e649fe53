//! PokeAPI client
//!
//! Fetches listing pages, detail documents and species documents from the
//! upstream REST API. Transport problems, non-success statuses and
//! undecodable bodies all surface as [`UpstreamError`]; deciding whether one
//! is fatal is left to the caller.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use super::{ListingEntry, ListingPage};

/// Base URL for the public PokeAPI
pub const DEFAULT_API_BASE_URL: &str = "https://pokeapi.co/api/v2";

/// Errors that can occur when talking to the upstream API
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// HTTP request failed (connection, timeout, body read)
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("Upstream returned status {status} for {url}")]
    Status { url: String, status: u16 },

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Read-only view of the upstream API used by the composition pipeline
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Fetches one listing page, deriving each entry's id from its resource URL
    async fn fetch_listing_page(&self, limit: u32, offset: u32) -> Result<ListingPage, UpstreamError>;

    /// Fetches the full detail document for one resource
    async fn fetch_detail(&self, id: u32) -> Result<Value, UpstreamError>;

    /// Fetches a linked species document by absolute URL
    async fn fetch_species(&self, url: &str) -> Result<Value, UpstreamError>;
}

/// Raw listing page as returned by `GET /pokemon?limit=&offset=`
#[derive(Debug, Deserialize)]
struct RawListing {
    count: u64,
    next: Option<String>,
    previous: Option<String>,
    results: Vec<RawListingEntry>,
}

#[derive(Debug, Deserialize)]
struct RawListingEntry {
    name: String,
    url: String,
}

/// Client for the PokeAPI REST endpoints
#[derive(Debug, Clone)]
pub struct PokeApiClient {
    client: Client,
    base_url: String,
}

impl PokeApiClient {
    /// Creates a client against `base_url` with a fixed per-request timeout
    ///
    /// The timeout bounds both connecting and reading each upstream call.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;

        Ok(Self::with_client(client, base_url))
    }

    /// Creates a client with a custom HTTP client
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Issues a GET and decodes the body as JSON
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, UpstreamError> {
        debug!(%url, "upstream request");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl Upstream for PokeApiClient {
    async fn fetch_listing_page(&self, limit: u32, offset: u32) -> Result<ListingPage, UpstreamError> {
        let url = format!("{}/pokemon?limit={}&offset={}", self.base_url, limit, offset);
        let raw: RawListing = self.get_json(&url).await?;
        Ok(into_listing_page(raw))
    }

    async fn fetch_detail(&self, id: u32) -> Result<Value, UpstreamError> {
        let url = format!("{}/pokemon/{}", self.base_url, id);
        self.get_json(&url).await
    }

    async fn fetch_species(&self, url: &str) -> Result<Value, UpstreamError> {
        self.get_json(url).await
    }
}

/// Converts a raw listing into a [`ListingPage`]
///
/// Entries whose URL does not end in a numeric id are skipped.
fn into_listing_page(raw: RawListing) -> ListingPage {
    let results = raw
        .results
        .into_iter()
        .filter_map(|entry| match id_from_url(&entry.url) {
            Some(id) => Some(ListingEntry { name: entry.name, id }),
            None => {
                warn!(name = %entry.name, url = %entry.url, "listing entry has no numeric id, skipping");
                None
            }
        })
        .collect();

    ListingPage {
        count: raw.count,
        next: raw.next,
        previous: raw.previous,
        results,
    }
}

/// Extracts the trailing id from a resource URL
///
/// `https://pokeapi.co/api/v2/pokemon/25/` yields `25`.
pub fn id_from_url(url: &str) -> Option<u32> {
    url.trim_end_matches('/').rsplit('/').next()?.parse().ok()
}
