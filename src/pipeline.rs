//! Cache-augmented fetch-and-compose pipeline
//!
//! [`Pokedex`] serves composed listings and full detail records. It reads
//! through a two-tier cache: composed listings live for five minutes,
//! individual records for a day. Listing items are resolved concurrently;
//! an item that fails is dropped from the page instead of failing it.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::cache::CacheStore;
use crate::data::{
    species_url, to_basic_record, to_full_record, to_species_info, BasicRecord, FullRecord,
    ListingEntry, ListingResult, SpeciesInfo, Upstream,
};
use crate::error::ServiceError;

/// Prefix shared by every key this crate writes
pub const NAMESPACE_PREFIX: &str = "pokemon:";

/// Lifetime of a composed listing page
pub const LIST_TTL: Duration = Duration::from_secs(5 * 60);

/// Lifetime of a per-item basic record
pub const BASIC_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Lifetime of a full detail record
pub const DETAIL_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Upper bound on per-item upstream fetches in flight for one listing
pub const MAX_CONCURRENT_FETCHES: usize = 16;

/// Flavor text language used when none is configured
pub const DEFAULT_FLAVOR_LANGUAGE: &str = "es";

pub fn list_key(limit: u32, offset: u32) -> String {
    format!("{}list:{}:{}", NAMESPACE_PREFIX, limit, offset)
}

/// Basic records are keyed by name, so the same Pokemon reached through
/// different pages shares one entry.
pub fn basic_key(name: &str) -> String {
    format!("{}basic:{}", NAMESPACE_PREFIX, name)
}

pub fn detail_key(id: u32) -> String {
    format!("{}detail:{}", NAMESPACE_PREFIX, id)
}

/// Composes listings and detail records from the upstream API and the cache
#[derive(Clone)]
pub struct Pokedex {
    upstream: Arc<dyn Upstream>,
    cache: CacheStore,
    flavor_language: String,
}

impl Pokedex {
    pub fn new(upstream: Arc<dyn Upstream>, cache: CacheStore) -> Self {
        Self {
            upstream,
            cache,
            flavor_language: DEFAULT_FLAVOR_LANGUAGE.to_string(),
        }
    }

    /// Sets the language tag used to pick species flavor text
    pub fn with_flavor_language(mut self, language: impl Into<String>) -> Self {
        self.flavor_language = language.into();
        self
    }

    /// Returns one page of basic records
    ///
    /// A cached page is returned as-is with `from_cache` set. Otherwise the
    /// page is fetched, each entry resolved through the per-item cache, and
    /// the composed result cached. Only a failure of the page fetch itself
    /// fails the call.
    pub async fn list_pokemon(&self, limit: u32, offset: u32) -> Result<ListingResult, ServiceError> {
        let cache_key = list_key(limit, offset);

        if let Some(mut cached) = self.cache.get_json::<ListingResult>(&cache_key).await {
            info!(key = %cache_key, "listing served from cache");
            cached.from_cache = true;
            return Ok(cached);
        }

        info!(limit, offset, "fetching listing page from upstream");
        let page = self
            .upstream
            .fetch_listing_page(limit, offset)
            .await
            .inspect_err(|e| error!(limit, offset, error = %e, "listing page fetch failed"))?;

        // buffered yields results in input order, not completion order.
        let results: Vec<BasicRecord> = stream::iter(&page.results)
            .map(|entry| self.resolve_basic(entry))
            .buffered(MAX_CONCURRENT_FETCHES)
            .filter_map(|record| async move { record })
            .collect()
            .await;

        if results.len() < page.results.len() {
            warn!(
                requested = page.results.len(),
                resolved = results.len(),
                "listing page is missing items that failed to resolve"
            );
        }

        let result = ListingResult {
            count: page.count,
            next: page.next,
            previous: page.previous,
            results,
            from_cache: false,
        };

        self.cache.set_json(&cache_key, &result, LIST_TTL).await;
        Ok(result)
    }

    /// Resolves one listing entry to a basic record
    ///
    /// Returns `None` when the detail fetch or normalization fails; the
    /// error is logged here and goes no further.
    async fn resolve_basic(&self, entry: &ListingEntry) -> Option<BasicRecord> {
        let cache_key = basic_key(&entry.name);

        if let Some(cached) = self.cache.get_json::<BasicRecord>(&cache_key).await {
            return Some(cached);
        }

        let raw = match self.upstream.fetch_detail(entry.id).await {
            Ok(raw) => raw,
            Err(e) => {
                error!(name = %entry.name, id = entry.id, error = %e, "failed to fetch basic details, dropping item");
                return None;
            }
        };

        match to_basic_record(&raw) {
            Ok(record) => {
                self.cache.set_json(&cache_key, &record, BASIC_TTL).await;
                Some(record)
            }
            Err(e) => {
                error!(name = %entry.name, id = entry.id, error = %e, "failed to normalize basic details, dropping item");
                None
            }
        }
    }

    /// Returns the full record for one Pokemon, with species data when available
    ///
    /// Fails only when the detail document cannot be fetched or normalized.
    pub async fn get_pokemon_detail(&self, id: u32) -> Result<FullRecord, ServiceError> {
        let cache_key = detail_key(id);

        if let Some(cached) = self.cache.get_json::<FullRecord>(&cache_key).await {
            info!(id, "detail served from cache");
            return Ok(cached);
        }

        info!(id, "fetching detail from upstream");
        let raw = self
            .upstream
            .fetch_detail(id)
            .await
            .inspect_err(|e| error!(id, error = %e, "detail fetch failed"))?;

        let mut record = to_full_record(&raw)
            .inspect_err(|e| error!(id, error = %e, "detail document is malformed"))?;
        record.species = self.fetch_species_info(id, &raw).await;

        self.cache.set_json(&cache_key, &record, DETAIL_TTL).await;
        Ok(record)
    }

    /// Best-effort species enrichment for a raw detail document
    async fn fetch_species_info(&self, id: u32, raw: &Value) -> Option<SpeciesInfo> {
        let url = match species_url(raw) {
            Ok(url) => url,
            Err(e) => {
                warn!(id, error = %e, "no species link, omitting species data");
                return None;
            }
        };

        let species = match self.upstream.fetch_species(&url).await {
            Ok(species) => species,
            Err(e) => {
                warn!(id, %url, error = %e, "species fetch failed, omitting species data");
                return None;
            }
        };

        match to_species_info(&species, &self.flavor_language) {
            Ok(info) => Some(info),
            Err(e) => {
                warn!(id, %url, error = %e, "species document is malformed, omitting species data");
                None
            }
        }
    }

    /// Deletes every entry under the `pokemon:` namespace
    ///
    /// Returns the number of keys deleted; zero is a normal outcome.
    pub async fn clear_cache(&self) -> Result<usize, ServiceError> {
        if !self.cache.is_available() {
            error!("cache store unavailable while clearing cache");
            return Err(ServiceError::CacheUnavailable);
        }

        let deleted = self
            .cache
            .delete_by_prefix(NAMESPACE_PREFIX)
            .await
            .inspect_err(|e| error!(error = %e, "failed to clear cache"))?;

        if deleted == 0 {
            info!("no cache keys to clear");
        } else {
            info!(deleted, "cache cleared");
        }
        Ok(deleted)
    }
}
