//! Device token persistence for pushrelay
//!
//! Tokens live in a key-value store behind the [`KeyValueBackend`] trait.
//! Production deployments use Redis ([`RedisBackend`]); tests and local runs
//! can use the in-process [`MemoryBackend`].
//!
//! # Example
//!
//! ```rust,no_run
//! use pushrelay_config::AppConfig;
//! use pushrelay_store::{StoreError, StoreFactory, TokenStore};
//!
//! async fn setup_store(config: &AppConfig) -> Result<TokenStore, StoreError> {
//!     let store = StoreFactory::new().from_app_config(config).await?;
//!     store.put_simple("user-1", "android", "fcm-token").await?;
//!     Ok(store)
//! }
//! ```

pub mod backend;
pub mod client;
pub mod error;
pub mod factory;
pub mod memory;
pub mod repositories;

pub use backend::KeyValueBackend;
pub use client::RedisBackend;
pub use error::StoreError;
pub use factory::StoreFactory;
pub use memory::MemoryBackend;

pub use repositories::{
    check_key_segment, detailed_key, detailed_ttl, detailed_user_prefix, simple_key, TokenStore,
    DETAILED_FALLBACK_TTL,
};
