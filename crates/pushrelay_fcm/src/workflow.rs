//! Registration and dispatch workflow
//!
//! Translates validated requests into token store and provider calls. Holds
//! only shared handles, so one instance serves every request concurrently.

use pushrelay_common::{
    not_found, validation_error, DeviceInfo, DeviceTokenRecord, Platform, RelayError,
};
use pushrelay_store::{check_key_segment, StoreError, TokenStore};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::identity::MAX_UID_CHARS;
use crate::models::TokenGenerationResult;
use crate::service::{IdentityTokenIssuer, NotificationDispatcher, TokenIssuer};

/// Checks that `value` is present, naming `field` otherwise.
fn require(field: &str, value: &str) -> Result<(), RelayError> {
    if value.is_empty() {
        return Err(validation_error(format!("{} is required", field)));
    }
    Ok(())
}

/// Like [`require`], and also refuses values that cannot address a store key.
fn require_key(field: &str, value: &str) -> Result<(), RelayError> {
    require(field, value)?;
    check_key_segment(field, value)?;
    Ok(())
}

/// Validates device metadata for server-side token generation.
///
/// Fails on the first missing field, in declaration order, then on a
/// platform outside `android | ios | web`. `user_id` and `device_id` must not
/// contain `:`. Returns the parsed platform.
pub fn validate_device_info(info: &DeviceInfo) -> Result<Platform, RelayError> {
    require_key("user_id", &info.user_id)?;
    require("platform", &info.platform)?;
    require("device_model", &info.device_model)?;
    require("os_version", &info.os_version)?;
    require("app_version", &info.app_version)?;
    require_key("device_id", &info.device_id)?;
    require("installation_id", &info.installation_id)?;

    info.platform
        .parse::<Platform>()
        .map_err(validation_error)
}

/// The orchestration layer behind every FCM route.
#[derive(Clone)]
pub struct TokenWorkflow {
    store: TokenStore,
    issuer: Arc<dyn TokenIssuer>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    identity: Arc<dyn IdentityTokenIssuer>,
}

impl TokenWorkflow {
    pub fn new(
        store: TokenStore,
        issuer: Arc<dyn TokenIssuer>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        identity: Arc<dyn IdentityTokenIssuer>,
    ) -> Self {
        Self {
            store,
            issuer,
            dispatcher,
            identity,
        }
    }

    /// Legacy registration: one token per `(user_id, platform)`.
    pub async fn register(
        &self,
        user_id: &str,
        platform: &str,
        token: &str,
    ) -> Result<(), RelayError> {
        require_key("user_id", user_id)?;
        require_key("platform", platform)?;
        require("token", token)?;

        self.store
            .put_simple(user_id, platform, token)
            .await
            .map_err(|e| {
                error!(user_id, platform, error = %e, "Failed to store token");
                RelayError::from(e)
            })?;
        info!(user_id, platform, "Registered FCM token");
        Ok(())
    }

    /// Looks up the legacy token for `(user_id, platform)` and relays one
    /// notification to it.
    ///
    /// # Errors
    ///
    /// * `RelayError::NotFoundError` when no token is registered; the provider
    ///   is not called
    /// * `RelayError::ProviderError` when the provider rejects the message
    pub async fn send(
        &self,
        user_id: &str,
        platform: &str,
        title: &str,
        body: &str,
    ) -> Result<(), RelayError> {
        require_key("user_id", user_id)?;
        require_key("platform", platform)?;

        let token = match self.store.get_simple(user_id, platform).await {
            Ok(token) => token,
            Err(StoreError::NotFound(_)) => {
                warn!(user_id, platform, "No token registered");
                return Err(not_found(format!(
                    "no token registered for user {} on {}",
                    user_id, platform
                )));
            }
            Err(e) => return Err(e.into()),
        };

        match self.dispatcher.send(&token, title, body).await {
            Ok(message_name) => {
                info!(user_id, platform, message_name = ?message_name, "Notification sent");
                Ok(())
            }
            Err(e) => {
                error!(user_id, platform, error = %e, "FCM send failed");
                Err(e.into())
            }
        }
    }

    /// Validates `device_info`, has the provider issue a token and stores the
    /// detailed record.
    ///
    /// The issued token is not revoked if the store write fails afterwards.
    pub async fn generate_and_register(
        &self,
        device_info: DeviceInfo,
    ) -> Result<TokenGenerationResult, RelayError> {
        let platform = validate_device_info(&device_info).map_err(|e| {
            warn!(user_id = %device_info.user_id, error = %e, "Device info validation failed");
            e
        })?;

        let result = self.issuer.generate_token(&device_info).await.map_err(|e| {
            error!(user_id = %device_info.user_id, error = %e, "FCM token generation failed");
            RelayError::from(e)
        })?;

        let record = DeviceTokenRecord::from_device_info(
            result.token.clone(),
            platform,
            &device_info,
            result.generated_at,
            result.expires_at,
        );
        if let Err(e) = self.store.put_detailed(&record).await {
            error!(
                user_id = %record.user_id,
                platform = %platform,
                device_id = %record.device_id,
                error = %e,
                "Issued token could not be stored and is lost"
            );
            return Err(e.into());
        }

        info!(
            user_id = %record.user_id,
            platform = %platform,
            device_id = %record.device_id,
            "FCM token generated and stored"
        );
        Ok(result)
    }

    /// Every stored device record of `user_id`; unreadable entries are left out.
    pub async fn list_user_tokens(
        &self,
        user_id: &str,
    ) -> Result<Vec<DeviceTokenRecord>, RelayError> {
        require_key("user_id", user_id)?;
        Ok(self.store.list_for_user(user_id).await?)
    }

    /// Removes one device's record. Deleting an absent record succeeds.
    pub async fn delete_device_token(
        &self,
        user_id: &str,
        platform: &str,
        device_id: &str,
    ) -> Result<(), RelayError> {
        require_key("user_id", user_id)?;
        require_key("device_id", device_id)?;
        let platform: Platform = platform.parse().map_err(validation_error)?;

        self.store
            .delete_detailed(user_id, platform, device_id)
            .await?;
        info!(user_id, platform = %platform, device_id, "Deleted device token");
        Ok(())
    }

    /// Issues a custom identity token for `user_id`.
    pub async fn issue_identity_token(&self, user_id: &str) -> Result<String, RelayError> {
        let chars = user_id.chars().count();
        if chars == 0 || chars > MAX_UID_CHARS {
            return Err(validation_error(format!(
                "user_id must be 1 to {} characters",
                MAX_UID_CHARS
            )));
        }

        self.identity.issue(user_id).await.map_err(|e| {
            error!(user_id, error = %e, "Token creation error");
            RelayError::from(e)
        })
    }
}
