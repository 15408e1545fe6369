//! In-process backend for the token store
//!
//! A mutex-guarded map with per-entry deadlines. Expired entries are dropped
//! lazily when touched. Used by the test suites and by `store.backend =
//! "memory"` for local runs.

use pushrelay_common::BoxFuture;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;

use crate::backend::KeyValueBackend;
use crate::error::StoreError;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    deadline: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.deadline.map_or(true, |deadline| deadline > now)
    }
}

/// Map-backed implementation of [`KeyValueBackend`]
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Entry>>, StoreError> {
        self.entries
            .lock()
            .map_err(|_| StoreError::Backend("memory backend lock poisoned".to_string()))
    }

    /// Remaining lifetime of `key`; `None` when absent or stored without expiry.
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        let entries = self.entries.lock().ok()?;
        let now = Instant::now();
        entries
            .get(key)
            .filter(|entry| entry.is_live(now))
            .and_then(|entry| entry.deadline)
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .map(|entries| entries.values().filter(|e| e.is_live(now)).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<(), StoreError> {
        let deadline = ttl.map(|ttl| Instant::now() + ttl);
        self.lock()?
            .insert(key.to_string(), Entry { value, deadline });
        Ok(())
    }
}

impl KeyValueBackend for MemoryBackend {
    fn get(&self, key: &str) -> BoxFuture<'_, Option<String>, StoreError> {
        let result = self.lock().map(|mut entries| {
            let now = Instant::now();
            match entries.get(key) {
                Some(entry) if entry.is_live(now) => Some(entry.value.clone()),
                Some(_) => {
                    entries.remove(key);
                    None
                }
                None => None,
            }
        });
        Box::pin(async move { result })
    }

    fn set(&self, key: &str, value: String) -> BoxFuture<'_, (), StoreError> {
        let result = self.insert(key, value, None);
        Box::pin(async move { result })
    }

    fn set_with_ttl(
        &self,
        key: &str,
        value: String,
        ttl: Duration,
    ) -> BoxFuture<'_, (), StoreError> {
        let result = self.insert(key, value, Some(ttl));
        Box::pin(async move { result })
    }

    fn delete(&self, key: &str) -> BoxFuture<'_, (), StoreError> {
        let result = self.lock().map(|mut entries| {
            entries.remove(key);
        });
        Box::pin(async move { result })
    }

    fn scan_prefix(&self, prefix: &str) -> BoxFuture<'_, Vec<String>, StoreError> {
        let result = self.lock().map(|entries| {
            let now = Instant::now();
            entries
                .iter()
                .filter(|(key, entry)| key.starts_with(prefix) && entry.is_live(now))
                .map(|(key, _)| key.clone())
                .collect::<Vec<_>>()
        });
        Box::pin(async move { result })
    }
}
