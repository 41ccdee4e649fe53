//! Availability-aware cache adapter
//!
//! Availability is decided once, when the adapter is built, and never
//! re-probed. An unavailable adapter answers every read with a miss and
//! every write with a no-op, so callers always fall back to fetching fresh.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{error, info, warn};

use super::store::{KeyValueStore, StoreError};

/// Cache adapter handed to the composition pipeline
#[derive(Clone)]
pub struct CacheStore {
    backend: Option<Arc<dyn KeyValueStore>>,
    available: bool,
}

impl std::fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore")
            .field("available", &self.available)
            .finish()
    }
}

impl CacheStore {
    /// Wraps `backend`, probing it once and logging the outcome
    pub async fn connect(backend: Arc<dyn KeyValueStore>) -> Self {
        match backend.ping().await {
            Ok(()) => {
                info!("connected to cache store");
                Self {
                    backend: Some(backend),
                    available: true,
                }
            }
            Err(e) => {
                error!(error = %e, "cache store unreachable, caching disabled");
                Self::unavailable()
            }
        }
    }

    /// An adapter without a backend; every operation passes through
    pub fn unavailable() -> Self {
        Self {
            backend: None,
            available: false,
        }
    }

    /// Whether the startup probe succeeded
    pub fn is_available(&self) -> bool {
        self.available
    }

    fn backend(&self) -> Option<&Arc<dyn KeyValueStore>> {
        if self.available {
            self.backend.as_ref()
        } else {
            None
        }
    }

    /// Returns the stored value, or `None` on a miss
    ///
    /// Backend failures are logged and reported as a miss.
    pub async fn get(&self, key: &str) -> Option<String> {
        let backend = self.backend()?;
        match backend.get(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!(%key, error = %e, "cache read failed, treating as miss");
                None
            }
        }
    }

    /// Reads and decodes a JSON value; an undecodable entry counts as a miss
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get(key).await?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(%key, error = %e, "cached entry could not be decoded, treating as miss");
                None
            }
        }
    }

    /// Writes `value` with an expiry, returning whether the write happened
    ///
    /// Failures are logged and never propagated.
    pub async fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> bool {
        let Some(backend) = self.backend() else {
            return false;
        };
        match backend.set_ex(key, value, ttl).await {
            Ok(()) => true,
            Err(e) => {
                warn!(%key, error = %e, "cache write failed");
                false
            }
        }
    }

    /// Encodes `value` as JSON and writes it with an expiry
    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) -> bool {
        match serde_json::to_string(value) {
            Ok(raw) => self.set_with_expiry(key, &raw, ttl).await,
            Err(e) => {
                warn!(%key, error = %e, "value could not be encoded for caching");
                false
            }
        }
    }

    /// Deletes every key starting with `prefix`, returning the count deleted
    ///
    /// Unlike reads and writes, failures here are surfaced to the caller.
    pub async fn delete_by_prefix(&self, prefix: &str) -> Result<usize, StoreError> {
        let backend = self.backend().ok_or(StoreError::Unavailable)?;
        let keys = backend.keys_with_prefix(prefix).await?;
        if keys.is_empty() {
            return Ok(0);
        }
        backend.delete_many(&keys).await
    }
}
