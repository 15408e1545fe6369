//! Error types for the token store

use pushrelay_common::RelayError;
use thiserror::Error;

/// Errors that can occur when reading or writing device tokens
#[derive(Debug, Error)]
pub enum StoreError {
    /// Nothing is stored under the key
    #[error("No token stored at {0}")]
    NotFound(String),

    /// A caller-supplied id cannot be used as a key segment
    #[error("Invalid key segment: {0}")]
    InvalidKey(String),

    /// The stored value is not a valid device token record
    #[error("Failed to parse stored record at {key}: {source}")]
    Deserialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The record could not be serialized for storage
    #[error("Failed to serialize record: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Error reported by the key-value backend
    #[error("Key-value backend error: {0}")]
    Backend(String),

    /// The backend did not answer within the configured timeout
    #[error("Key-value backend timed out: {0}")]
    Timeout(String),

    /// Error with the store configuration
    #[error("Store configuration error: {0}")]
    Config(String),
}

impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        StoreError::Backend(err.to_string())
    }
}

impl From<StoreError> for RelayError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => RelayError::NotFoundError(err.to_string()),
            StoreError::InvalidKey(msg) => RelayError::ValidationError(msg),
            other => RelayError::StoreError(other.to_string()),
        }
    }
}
