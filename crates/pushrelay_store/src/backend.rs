//! Key-value backend abstraction
//!
//! The token store only needs five primitive operations from its backend.
//! Keeping them behind a trait lets the same key layout and TTL policy run
//! against Redis in production and an in-process map in tests.

use pushrelay_common::BoxFuture;
use std::time::Duration;

use crate::error::StoreError;

/// Primitive string operations the token store is built on.
///
/// Implementations must make each single-key operation atomic; nothing in
/// the store relies on cross-key transactions.
pub trait KeyValueBackend: Send + Sync {
    /// Reads the value at `key`, `None` when absent or expired.
    fn get(&self, key: &str) -> BoxFuture<'_, Option<String>, StoreError>;

    /// Writes `value` at `key` without expiry, replacing any previous value.
    fn set(&self, key: &str, value: String) -> BoxFuture<'_, (), StoreError>;

    /// Writes `value` at `key`; the backend drops it after `ttl`.
    fn set_with_ttl(&self, key: &str, value: String, ttl: Duration)
        -> BoxFuture<'_, (), StoreError>;

    /// Removes `key`. Removing an absent key succeeds.
    fn delete(&self, key: &str) -> BoxFuture<'_, (), StoreError>;

    /// Lists every live key starting with `prefix`, in no particular order.
    fn scan_prefix(&self, prefix: &str) -> BoxFuture<'_, Vec<String>, StoreError>;
}
