// --- File: crates/pushrelay_common/src/error.rs ---
use std::fmt;
use thiserror::Error;

/// The error type every request-facing failure is translated into.
///
/// Each crate keeps its own error enum and implements `From<SpecificError>`
/// for `RelayError`; the HTTP layer only ever sees this type.
#[derive(Error, Debug)]
pub enum RelayError {
    /// Malformed body or a missing/invalid field
    #[error("Invalid request: {0}")]
    ValidationError(String),

    /// Nothing stored at the requested address
    #[error("Not found: {0}")]
    NotFoundError(String),

    /// Connectivity or (de)serialization failure against the key-value store
    #[error("Store error: {0}")]
    StoreError(String),

    /// The messaging provider rejected the call or could not be reached
    #[error("Provider error: {}", provider_message(.status, .message))]
    ProviderError {
        status: Option<u16>,
        message: String,
    },

    /// Missing or unreadable configuration, including the credential file
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Identity token issuance failed
    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

fn provider_message(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("{} - {}", code, message),
        None => message.to_string(),
    }
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for RelayError {
    fn status_code(&self) -> u16 {
        match self {
            RelayError::ValidationError(_) => 400,
            RelayError::NotFoundError(_) => 404,
            RelayError::StoreError(_) => 500,
            RelayError::ProviderError { .. } => 500,
            RelayError::ConfigError(_) => 500,
            RelayError::AuthError(_) => 500,
            RelayError::InternalError(_) => 500,
        }
    }
}

/// A trait for adding context to errors.
pub trait Context<T, E> {
    /// Adds context to an error.
    fn context<C>(self, context: C) -> Result<T, RelayError>
    where
        C: fmt::Display + Send + Sync + 'static;

    /// Adds context to an error with a lazy context provider.
    fn with_context<C, F>(self, f: F) -> Result<T, RelayError>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E: std::error::Error + Send + Sync + 'static> Context<T, E> for Result<T, E> {
    fn context<C>(self, context: C) -> Result<T, RelayError>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|error| RelayError::InternalError(format!("{}: {}", context, error)))
    }

    fn with_context<C, F>(self, f: F) -> Result<T, RelayError>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|error| RelayError::InternalError(format!("{}: {}", f(), error)))
    }
}

// Utility functions for error handling
pub fn validation_error<T: fmt::Display>(message: T) -> RelayError {
    RelayError::ValidationError(message.to_string())
}

pub fn not_found<T: fmt::Display>(message: T) -> RelayError {
    RelayError::NotFoundError(message.to_string())
}

pub fn config_error<T: fmt::Display>(message: T) -> RelayError {
    RelayError::ConfigError(message.to_string())
}
