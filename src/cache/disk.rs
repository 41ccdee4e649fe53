//! Directory-backed key-value store
//!
//! Stores each key as a JSON file holding the value and its expiry
//! timestamp. Expired entries read as absent and are removed lazily.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tokio::fs;

use super::store::{KeyValueStore, StoreError};

/// Wrapper struct for an entry stored on disk
#[derive(Debug, Serialize, Deserialize)]
struct DiskEntry {
    /// The original key, since file names are escaped
    key: String,
    /// The stored JSON document
    value: String,
    /// When the value was written
    cached_at: DateTime<Utc>,
    /// When the value stops being served
    expires_at: DateTime<Utc>,
}

impl DiskEntry {
    fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Stores cache entries as JSON files in a single directory
///
/// Defaults to an XDG-compliant cache directory (`~/.cache/pokecache/` on
/// Linux).
#[derive(Debug, Clone)]
pub struct DiskStore {
    /// Directory where entry files are stored
    cache_dir: PathBuf,
}

impl DiskStore {
    /// Creates a DiskStore using the XDG-compliant cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "pokecache")?;
        let cache_dir = project_dirs.cache_dir().to_path_buf();
        Some(Self { cache_dir })
    }

    /// Creates a DiskStore with a custom cache directory
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Returns the path of the file backing `key`
    ///
    /// Characters outside `[A-Za-z0-9_-]` are escaped as `%XX` so keys like
    /// `pokemon:list:20:0` map to valid, distinct file names.
    fn entry_path(&self, key: &str) -> PathBuf {
        let mut file_name = String::with_capacity(key.len() + 5);
        for byte in key.bytes() {
            if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
                file_name.push(byte as char);
            } else {
                file_name.push_str(&format!("%{:02X}", byte));
            }
        }
        file_name.push_str(".json");
        self.cache_dir.join(file_name)
    }

    /// Reads an entry file, treating a missing file as `None`
    async fn read_entry(&self, path: &Path) -> Result<Option<DiskEntry>, StoreError> {
        match fs::read_to_string(path).await {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Removes a file, ignoring one that is already gone
    async fn remove(path: &Path) -> Result<bool, StoreError> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl KeyValueStore for DiskStore {
    async fn ping(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.cache_dir).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.entry_path(key);
        match self.read_entry(&path).await? {
            Some(entry) if entry.is_expired() => {
                Self::remove(&path).await?;
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value)),
            None => Ok(None),
        }
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        fs::create_dir_all(&self.cache_dir).await?;

        let now = Utc::now();
        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let entry = DiskEntry {
            key: key.to_string(),
            value: value.to_string(),
            cached_at: now,
            expires_at,
        };

        let json = serde_json::to_string(&entry)?;
        fs::write(self.entry_path(key), json).await?;
        Ok(())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let mut dir = match fs::read_dir(&self.cache_dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut keys = Vec::new();
        while let Some(file) = dir.next_entry().await? {
            let path = file.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            // Unreadable or foreign files are not ours to report.
            if let Ok(Some(entry)) = self.read_entry(&path).await {
                if entry.key.starts_with(prefix) && !entry.is_expired() {
                    keys.push(entry.key);
                }
            }
        }

        keys.sort();
        Ok(keys)
    }

    async fn delete_many(&self, keys: &[String]) -> Result<usize, StoreError> {
        let mut deleted = 0;
        for key in keys {
            if Self::remove(&self.entry_path(key)).await? {
                deleted += 1;
            }
        }
        Ok(deleted)
    }
}
