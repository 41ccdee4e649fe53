//! Key-value backend contract

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by a cache backend
#[derive(Debug, Error)]
pub enum StoreError {
    /// The adapter was constructed without a reachable backend
    #[error("Cache store is unavailable")]
    Unavailable,

    /// Redis command or connection failed
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Filesystem access failed
    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored entry could not be encoded or decoded
    #[error("Cache entry serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backend did not answer in time
    #[error("Cache operation timed out after {0:?}")]
    Timeout(Duration),
}

/// A key-value store with per-key expiry and prefix enumeration
///
/// Values are serialized JSON documents.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Checks that the backend is reachable
    async fn ping(&self) -> Result<(), StoreError>;

    /// Returns the stored value, or `None` for a missing or expired key
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Writes `value` under `key`, expiring after `ttl`
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError>;

    /// Lists all live keys starting with `prefix`
    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError>;

    /// Deletes the given keys, returning how many existed
    async fn delete_many(&self, keys: &[String]) -> Result<usize, StoreError>;
}
