//! Repository for push device tokens
//!
//! Key layout:
//!
//! * `token:<user>:<platform>` holds a bare token string with no expiry. This
//!   is the legacy registration path and keeps one token per platform per user.
//! * `token:detailed:<user>:<platform>:<device>` holds a JSON
//!   [`DeviceTokenRecord`] and expires with the record.
//!
//! Segments are joined with `:`, so ids containing it are refused with
//! `StoreError::InvalidKey` before any key is built.

use chrono::{DateTime, Utc};
use pushrelay_common::{DeviceTokenRecord, Platform};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::backend::KeyValueBackend;
use crate::error::StoreError;
use crate::memory::MemoryBackend;

/// TTL used when a record's expiration is already in the past.
pub const DETAILED_FALLBACK_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

const KEY_PREFIX: &str = "token";
const DETAILED_SEGMENT: &str = "detailed";
pub const KEY_SEPARATOR: char = ':';

/// Refuses a caller-supplied id that would shift the key segments.
pub fn check_key_segment(field: &str, value: &str) -> Result<(), StoreError> {
    if value.contains(KEY_SEPARATOR) {
        return Err(StoreError::InvalidKey(format!(
            "{} must not contain '{}'",
            field, KEY_SEPARATOR
        )));
    }
    Ok(())
}

pub fn simple_key(user_id: &str, platform: &str) -> String {
    format!("{}:{}:{}", KEY_PREFIX, user_id, platform)
}

pub fn detailed_key(user_id: &str, platform: Platform, device_id: &str) -> String {
    format!(
        "{}:{}:{}:{}:{}",
        KEY_PREFIX, DETAILED_SEGMENT, user_id, platform, device_id
    )
}

/// Prefix shared by every detailed key of `user_id`.
pub fn detailed_user_prefix(user_id: &str) -> String {
    format!("{}:{}:{}:", KEY_PREFIX, DETAILED_SEGMENT, user_id)
}

/// Store-level lifetime for a record expiring at `expires_at`.
///
/// Whole seconds until expiry; a non-positive result falls back to
/// [`DETAILED_FALLBACK_TTL`] rather than writing an already-dead entry.
pub fn detailed_ttl(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    let remaining = (expires_at - now).num_seconds();
    if remaining <= 0 {
        DETAILED_FALLBACK_TTL
    } else {
        Duration::from_secs(remaining as u64)
    }
}

/// Device token persistence over a [`KeyValueBackend`]
///
/// Cheap to clone; all clones share the backend handle. Holds no state of its
/// own, so concurrent requests need no coordination beyond what the backend
/// gives per key.
#[derive(Clone)]
pub struct TokenStore {
    backend: Arc<dyn KeyValueBackend>,
}

impl TokenStore {
    pub fn new(backend: Arc<dyn KeyValueBackend>) -> Self {
        Self { backend }
    }

    /// A store over a fresh [`MemoryBackend`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    /// Overwrites the legacy token for `(user_id, platform)`.
    ///
    /// Only the key segments are checked; callers validate everything else.
    pub async fn put_simple(
        &self,
        user_id: &str,
        platform: &str,
        token: &str,
    ) -> Result<(), StoreError> {
        check_key_segment("user_id", user_id)?;
        check_key_segment("platform", platform)?;
        let key = simple_key(user_id, platform);
        self.backend.set(&key, token.to_string()).await?;
        debug!(user_id, platform, "Stored simple token");
        Ok(())
    }

    /// Reads the legacy token for `(user_id, platform)`.
    ///
    /// # Errors
    ///
    /// `StoreError::NotFound` when nothing is registered.
    pub async fn get_simple(&self, user_id: &str, platform: &str) -> Result<String, StoreError> {
        check_key_segment("user_id", user_id)?;
        check_key_segment("platform", platform)?;
        let key = simple_key(user_id, platform);
        self.backend
            .get(&key)
            .await?
            .ok_or(StoreError::NotFound(key))
    }

    /// Stores the full record under its `(user, platform, device)` address.
    ///
    /// The entry expires with the record; see [`detailed_ttl`] for records
    /// whose expiration has already passed.
    pub async fn put_detailed(&self, record: &DeviceTokenRecord) -> Result<(), StoreError> {
        self.put_detailed_at(record, Utc::now()).await
    }

    pub(crate) async fn put_detailed_at(
        &self,
        record: &DeviceTokenRecord,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        check_key_segment("user_id", &record.user_id)?;
        check_key_segment("device_id", &record.device_id)?;
        let key = detailed_key(&record.user_id, record.platform, &record.device_id);
        let data = serde_json::to_string(record).map_err(StoreError::Serialization)?;
        let ttl = detailed_ttl(record.expires_at, now);
        if record.expires_at <= now {
            warn!(
                user_id = %record.user_id,
                platform = %record.platform,
                device_id = %record.device_id,
                "Record already expired, storing with fallback TTL"
            );
        }

        self.backend.set_with_ttl(&key, data, ttl).await?;
        debug!(
            user_id = %record.user_id,
            platform = %record.platform,
            device_id = %record.device_id,
            ttl_secs = ttl.as_secs(),
            "Stored detailed token"
        );
        Ok(())
    }

    /// Reads the record stored for `(user_id, platform, device_id)`.
    ///
    /// # Errors
    ///
    /// * `StoreError::NotFound` when nothing is stored
    /// * `StoreError::Deserialization` when the stored value is not a record
    pub async fn get_detailed(
        &self,
        user_id: &str,
        platform: Platform,
        device_id: &str,
    ) -> Result<DeviceTokenRecord, StoreError> {
        check_key_segment("user_id", user_id)?;
        check_key_segment("device_id", device_id)?;
        let key = detailed_key(user_id, platform, device_id);
        let data = self
            .backend
            .get(&key)
            .await?
            .ok_or_else(|| StoreError::NotFound(key.clone()))?;
        serde_json::from_str(&data).map_err(|source| StoreError::Deserialization { key, source })
    }

    /// Every detailed record of `user_id`, in backend scan order.
    ///
    /// Keys that vanish, fail to load or fail to parse between the scan and
    /// the read are skipped, so the result may be partial. Only a failing scan
    /// fails the call.
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<DeviceTokenRecord>, StoreError> {
        check_key_segment("user_id", user_id)?;
        let keys = self
            .backend
            .scan_prefix(&detailed_user_prefix(user_id))
            .await?;

        let mut records = Vec::with_capacity(keys.len());
        for key in keys {
            let data = match self.backend.get(&key).await {
                Ok(Some(data)) => data,
                Ok(None) => continue,
                Err(err) => {
                    warn!(key = %key, error = %err, "Skipping unreadable token entry");
                    continue;
                }
            };
            let record: DeviceTokenRecord = match serde_json::from_str(&data) {
                Ok(record) => record,
                Err(err) => {
                    warn!(key = %key, error = %err, "Skipping corrupted token entry");
                    continue;
                }
            };
            // entries written around this store may still sit under the prefix
            if record.user_id != user_id {
                continue;
            }
            records.push(record);
        }
        Ok(records)
    }

    /// Removes the record for `(user_id, platform, device_id)`; absent is fine.
    pub async fn delete_detailed(
        &self,
        user_id: &str,
        platform: Platform,
        device_id: &str,
    ) -> Result<(), StoreError> {
        check_key_segment("user_id", user_id)?;
        check_key_segment("device_id", device_id)?;
        let key = detailed_key(user_id, platform, device_id);
        self.backend.delete(&key).await?;
        debug!(user_id, platform = %platform, device_id, "Deleted detailed token");
        Ok(())
    }
}
