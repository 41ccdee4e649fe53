//! Redis-backed key-value store
//!
//! Uses a multiplexed async connection, `SETEX` for writes and
//! `KEYS` + `DEL` for prefix deletion. Every command is bounded by the
//! configured timeout.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client, ConnectionAddr, ConnectionInfo, RedisConnectionInfo};

use super::store::{KeyValueStore, StoreError};
use crate::config::RedisConfig;

/// Builds Redis connection parameters from the structured configuration
pub fn connection_info(config: &RedisConfig) -> ConnectionInfo {
    let addr = if config.use_tls {
        ConnectionAddr::TcpTls {
            host: config.host.clone(),
            port: config.port,
            insecure: false,
            tls_params: None,
        }
    } else {
        ConnectionAddr::Tcp(config.host.clone(), config.port)
    };

    ConnectionInfo {
        addr,
        redis: RedisConnectionInfo {
            password: config.password.clone(),
            ..Default::default()
        },
    }
}

/// Redis-backed cache store
pub struct RedisStore {
    conn: MultiplexedConnection,
    timeout: Duration,
}

impl RedisStore {
    /// Opens a multiplexed connection to the configured server
    pub async fn connect(config: &RedisConfig, timeout: Duration) -> Result<Self, StoreError> {
        let client = Client::open(connection_info(config))?;
        let conn = tokio::time::timeout(timeout, client.get_multiplexed_async_connection())
            .await
            .map_err(|_| StoreError::Timeout(timeout))??;

        Ok(Self { conn, timeout })
    }

    /// Runs one command future under the store timeout
    async fn bounded<T, F>(&self, command: F) -> Result<T, StoreError>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        tokio::time::timeout(self.timeout, command)
            .await
            .map_err(|_| StoreError::Timeout(self.timeout))?
            .map_err(StoreError::from)
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let _pong: String = self.bounded(redis::cmd("PING").query_async(&mut conn)).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = self.bounded(conn.get(key)).await?;
        Ok(value)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        // SETEX rejects a zero expiry.
        let seconds = ttl.as_secs().max(1);
        let _: () = self.bounded(conn.set_ex(key, value, seconds)).await?;
        Ok(())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let mut conn = self.conn.clone();
        let pattern = format!("{}*", prefix);
        let keys: Vec<String> = self.bounded(conn.keys(pattern)).await?;
        Ok(keys)
    }

    async fn delete_many(&self, keys: &[String]) -> Result<usize, StoreError> {
        if keys.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn.clone();
        let deleted: usize = self.bounded(conn.del(keys.to_vec())).await?;
        Ok(deleted)
    }
}
