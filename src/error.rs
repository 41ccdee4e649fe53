//! Errors surfaced by the composition pipeline and their JSON rendering

use serde::Serialize;
use thiserror::Error;

use crate::cache::StoreError;
use crate::data::{NormalizeError, UpstreamError};

/// Errors that fail a whole pipeline call
///
/// Failures limited to one item of a listing, or to species enrichment,
/// never reach this type.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The upstream API could not serve the requested resource
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// The requested resource came back without a required field
    #[error(transparent)]
    Malformed(#[from] NormalizeError),

    /// The operation needs a cache store and none is reachable
    #[error("Cache store is not available")]
    CacheUnavailable,

    /// The cache store failed during invalidation
    #[error("Cache store error: {0}")]
    Store(#[from] StoreError),
}

/// JSON error body: a short summary plus the underlying detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>, cause: &dyn std::fmt::Display) -> Self {
        Self {
            error: error.into(),
            message: cause.to_string(),
        }
    }

    /// Format as a JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.message.clone())
    }
}
