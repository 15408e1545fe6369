//! Factory for creating token stores
//!
//! Picks the key-value backend named by `store.backend` and wraps it in a
//! [`TokenStore`].

use pushrelay_config::{AppConfig, RedisConfig, StoreBackendKind};
use std::sync::Arc;
use tracing::{debug, info};

use crate::backend::KeyValueBackend;
use crate::client::RedisBackend;
use crate::error::StoreError;
use crate::memory::MemoryBackend;
use crate::repositories::TokenStore;

/// Factory for creating token stores
#[derive(Debug, Clone, Default)]
pub struct StoreFactory;

impl StoreFactory {
    pub fn new() -> Self {
        Self
    }

    /// Create a token store from an application configuration
    ///
    /// # Errors
    ///
    /// Fails when the Redis backend is selected and the connection cannot be
    /// established (see [`RedisBackend::connect`]).
    pub async fn from_app_config(&self, config: &AppConfig) -> Result<TokenStore, StoreError> {
        debug!(backend = ?config.store.backend, "Creating token store from application configuration");
        let backend = self
            .backend_for(config.store.backend, &config.redis)
            .await?;
        Ok(TokenStore::new(backend))
    }

    /// Build the raw backend for `kind`.
    pub async fn backend_for(
        &self,
        kind: StoreBackendKind,
        redis: &RedisConfig,
    ) -> Result<Arc<dyn KeyValueBackend>, StoreError> {
        match kind {
            StoreBackendKind::Redis => {
                let backend = RedisBackend::connect(redis).await?;
                Ok(Arc::new(backend))
            }
            StoreBackendKind::Memory => {
                info!("Using in-memory token store; tokens are lost on restart");
                Ok(Arc::new(MemoryBackend::new()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pushrelay_common::Platform;

    #[tokio::test]
    async fn test_memory_backend_from_config() {
        let mut config = AppConfig::default();
        config.store.backend = StoreBackendKind::Memory;

        let store = StoreFactory::new().from_app_config(&config).await.unwrap();
        store.put_simple("u1", "ios", "T").await.unwrap();
        assert_eq!(store.get_simple("u1", "ios").await.unwrap(), "T");
        assert!(store.list_for_user("u1").await.unwrap().is_empty());
        assert!(store
            .get_detailed("u1", Platform::Ios, "d")
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_redis_backend_with_bad_address_fails() {
        let mut config = AppConfig::default();
        config.redis.addr = "redis://[broken".to_string();

        let result = StoreFactory::new().from_app_config(&config).await;
        assert!(matches!(result, Err(StoreError::Config(_))));
    }
}
