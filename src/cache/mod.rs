//! Cache module for storing composed listings and per-item records
//!
//! [`CacheStore`] is the adapter the pipeline talks to. It wraps any
//! [`KeyValueStore`] backend (Redis or an on-disk directory), probes it once
//! at construction and degrades to pass-through when the backend cannot be
//! reached.

mod adapter;
mod disk;
mod redis_store;
mod store;

pub use adapter::CacheStore;
pub use disk::DiskStore;
pub use redis_store::RedisStore;
pub use store::{KeyValueStore, StoreError};

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, warn};

use crate::config::StoreConfig;

/// Opens the configured backend and wraps it in a probed [`CacheStore`]
///
/// A backend that cannot be opened yields an unavailable adapter; this never
/// fails.
pub async fn open(config: &StoreConfig, timeout: Duration) -> CacheStore {
    match config {
        StoreConfig::Redis(redis) => match RedisStore::connect(redis, timeout).await {
            Ok(store) => CacheStore::connect(Arc::new(store)).await,
            Err(e) => {
                error!(host = %redis.host, port = redis.port, error = %e, "failed to connect to Redis, caching disabled");
                CacheStore::unavailable()
            }
        },
        StoreConfig::Disk(Some(dir)) => {
            CacheStore::connect(Arc::new(DiskStore::with_dir(dir.clone()))).await
        }
        StoreConfig::Disk(None) => match DiskStore::new() {
            Some(store) => CacheStore::connect(Arc::new(store)).await,
            None => {
                error!("no cache directory could be determined, caching disabled");
                CacheStore::unavailable()
            }
        },
        StoreConfig::None => {
            warn!("no cache store configured, caching disabled");
            CacheStore::unavailable()
        }
    }
}
