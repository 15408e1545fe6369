//! Service seams used by the workflow.
//!
//! The workflow only sees these traits, so tests can swap the provider
//! clients for recording fakes.

use pushrelay_common::{BoxFuture, DeviceInfo};

use crate::error::FirebaseError;
use crate::models::TokenGenerationResult;

/// Obtains a delivery token from the provider for a device.
pub trait TokenIssuer: Send + Sync {
    fn generate_token(
        &self,
        device_info: &DeviceInfo,
    ) -> BoxFuture<'_, TokenGenerationResult, FirebaseError>;
}

/// Delivers one notification to one delivery token.
pub trait NotificationDispatcher: Send + Sync {
    /// Returns the provider's message name when it reports one.
    fn send(&self, token: &str, title: &str, body: &str)
        -> BoxFuture<'_, Option<String>, FirebaseError>;
}

/// Issues identity tokens clients exchange for a provider session.
pub trait IdentityTokenIssuer: Send + Sync {
    fn issue(&self, user_id: &str) -> BoxFuture<'_, String, FirebaseError>;
}
