//! Redis backend for the token store
//!
//! Wraps a `redis::aio::ConnectionManager`, which reconnects on its own and is
//! cheap to clone, so every operation works on its own clone. Each command is
//! bounded by the configured operation timeout.

use pushrelay_common::BoxFuture;
use pushrelay_config::RedisConfig;
use redis::aio::ConnectionManager;
use redis::{
    AsyncCommands, ConnectionAddr, ConnectionInfo, IntoConnectionInfo, RedisConnectionInfo,
    RedisResult,
};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info};

use crate::backend::KeyValueBackend;
use crate::error::StoreError;

/// Keys fetched per SCAN round-trip.
const SCAN_BATCH: usize = 200;

const DEFAULT_REDIS_PORT: u16 = 6379;

/// Connection parameters for `config`.
///
/// An address carrying a `redis://` or `rediss://` scheme is parsed as a URL
/// and used as is. A bare `host:port` is combined with the configured
/// password and database without going through URL parsing, so the password
/// may contain any character.
pub fn connection_info(config: &RedisConfig) -> Result<ConnectionInfo, StoreError> {
    let addr = config.addr.trim();
    if addr.starts_with("redis://") || addr.starts_with("rediss://") {
        return addr
            .into_connection_info()
            .map_err(|e| StoreError::Config(format!("invalid redis address: {}", e)));
    }

    let (host, port) = match addr.rsplit_once(':') {
        Some((host, port)) => {
            let port = port.parse::<u16>().map_err(|e| {
                StoreError::Config(format!("invalid redis port in {}: {}", addr, e))
            })?;
            (host, port)
        }
        None => (addr, DEFAULT_REDIS_PORT),
    };
    let host = host.trim_start_matches('[').trim_end_matches(']');
    if host.is_empty() {
        return Err(StoreError::Config(format!(
            "invalid redis address: missing host in {:?}",
            addr
        )));
    }

    Ok(ConnectionInfo {
        addr: ConnectionAddr::Tcp(host.to_string(), port),
        redis: RedisConnectionInfo {
            db: config.db,
            password: config.password.clone().filter(|p| !p.is_empty()),
            ..RedisConnectionInfo::default()
        },
    })
}

/// Redis implementation of [`KeyValueBackend`]
#[derive(Clone)]
pub struct RedisBackend {
    manager: ConnectionManager,
    op_timeout: Duration,
}

impl RedisBackend {
    /// Connects to Redis using the provided configuration.
    ///
    /// # Errors
    ///
    /// * `StoreError::Config` if the address cannot be parsed
    /// * `StoreError::Timeout` if the first connection takes longer than the
    ///   operation timeout
    /// * `StoreError::Backend` if the connection is refused
    pub async fn connect(config: &RedisConfig) -> Result<Self, StoreError> {
        let client = redis::Client::open(connection_info(config)?)
            .map_err(|e| StoreError::Config(format!("invalid redis address: {}", e)))?;
        let op_timeout = Duration::from_millis(config.op_timeout_ms.max(1));

        let manager = match tokio::time::timeout(op_timeout, ConnectionManager::new(client)).await
        {
            Ok(result) => result?,
            Err(_) => {
                return Err(StoreError::Timeout(format!(
                    "connecting to {} exceeded {:?}",
                    config.addr, op_timeout
                )))
            }
        };

        info!(addr = %config.addr, db = config.db, "Connected to Redis");
        Ok(Self::from_manager(manager, op_timeout))
    }

    /// Wraps an existing connection manager.
    pub fn from_manager(manager: ConnectionManager, op_timeout: Duration) -> Self {
        Self {
            manager,
            op_timeout,
        }
    }

    async fn bounded<T, F>(&self, op: &str, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = RedisResult<T>>,
    {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(result) => result.map_err(StoreError::from),
            Err(_) => Err(StoreError::Timeout(format!(
                "{} exceeded {:?}",
                op, self.op_timeout
            ))),
        }
    }
}

/// Escapes the glob metacharacters understood by `SCAN MATCH`.
pub fn escape_glob(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl KeyValueBackend for RedisBackend {
    fn get(&self, key: &str) -> BoxFuture<'_, Option<String>, StoreError> {
        let key = key.to_string();
        Box::pin(async move {
            let mut conn = self.manager.clone();
            self.bounded("GET", conn.get::<_, Option<String>>(&key)).await
        })
    }

    fn set(&self, key: &str, value: String) -> BoxFuture<'_, (), StoreError> {
        let key = key.to_string();
        Box::pin(async move {
            let mut conn = self.manager.clone();
            self.bounded("SET", conn.set::<_, _, ()>(&key, value)).await
        })
    }

    fn set_with_ttl(
        &self,
        key: &str,
        value: String,
        ttl: Duration,
    ) -> BoxFuture<'_, (), StoreError> {
        let key = key.to_string();
        // EX takes whole seconds and rejects 0
        let seconds = ttl.as_secs().max(1);
        Box::pin(async move {
            let mut conn = self.manager.clone();
            self.bounded("SETEX", conn.set_ex::<_, _, ()>(&key, value, seconds))
                .await
        })
    }

    fn delete(&self, key: &str) -> BoxFuture<'_, (), StoreError> {
        let key = key.to_string();
        Box::pin(async move {
            let mut conn = self.manager.clone();
            self.bounded("DEL", conn.del::<_, ()>(&key)).await
        })
    }

    fn scan_prefix(&self, prefix: &str) -> BoxFuture<'_, Vec<String>, StoreError> {
        let pattern = format!("{}*", escape_glob(prefix));
        Box::pin(async move {
            let mut conn = self.manager.clone();
            let mut keys = Vec::new();
            let mut cursor: u64 = 0;
            loop {
                let mut scan = redis::cmd("SCAN");
                scan.arg(cursor)
                    .arg("MATCH")
                    .arg(&pattern)
                    .arg("COUNT")
                    .arg(SCAN_BATCH);
                let (next, batch): (u64, Vec<String>) =
                    self.bounded("SCAN", scan.query_async(&mut conn)).await?;
                keys.extend(batch);
                if next == 0 {
                    break;
                }
                cursor = next;
            }
            // SCAN may return a key more than once
            keys.sort();
            keys.dedup();
            debug!(pattern = %pattern, count = keys.len(), "Scanned keys");
            Ok(keys)
        })
    }
}
