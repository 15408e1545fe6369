//! Errors raised while talking to Firebase

use pushrelay_common::{config_error, RelayError};
use thiserror::Error;

/// Errors that can occur when interacting with the Firebase Cloud Messaging API
#[derive(Error, Debug)]
pub enum FirebaseError {
    /// The service-account key is missing, unreadable or incomplete
    #[error("Credential error: {0}")]
    CredentialError(String),

    /// The OAuth2 exchange for a bearer token failed
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// Error during HTTP request to Firebase API
    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Non-2xx answer from the Firebase API
    #[error("Firebase API error: {status} - {body}")]
    ApiError { status: u16, body: String },

    /// A 2xx answer whose body could not be understood
    #[error("Unexpected Firebase response: {0}")]
    InvalidResponse(String),

    /// Signing a custom identity token failed
    #[error("Identity token error: {0}")]
    IdentityError(String),
}

impl From<FirebaseError> for RelayError {
    fn from(err: FirebaseError) -> Self {
        match err {
            FirebaseError::CredentialError(msg) => config_error(msg),
            FirebaseError::AuthError(msg) => RelayError::ProviderError {
                status: None,
                message: format!("credential exchange failed: {}", msg),
            },
            FirebaseError::RequestError(e) => RelayError::ProviderError {
                status: e.status().map(|s| s.as_u16()),
                message: e.to_string(),
            },
            FirebaseError::ApiError { status, body } => RelayError::ProviderError {
                status: Some(status),
                message: body,
            },
            FirebaseError::InvalidResponse(msg) => RelayError::ProviderError {
                status: None,
                message: msg,
            },
            FirebaseError::IdentityError(msg) => RelayError::AuthError(msg),
        }
    }
}
