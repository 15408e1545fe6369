//! Service factory implementation.
//!
//! Builds every long-lived handle once at startup: the token store, the FCM
//! client and the identity issuer, wired into one [`TokenWorkflow`].

use pushrelay_common::RelayError;
use pushrelay_config::AppConfig;
use pushrelay_fcm::{
    CredentialSource, FcmClient, IdentityTokenIssuer, ServiceAccountCredentials,
    ServiceAccountIdentityIssuer, TokenWorkflow,
};
use pushrelay_store::{StoreFactory, TokenStore};
use std::sync::Arc;
use tracing::info;

/// Owns the services shared by every request.
pub struct PushRelayServiceFactory {
    store: TokenStore,
    workflow: TokenWorkflow,
}

impl PushRelayServiceFactory {
    /// Create the production services.
    ///
    /// # Errors
    ///
    /// * `RelayError::ConfigError` when `firebase.key_path` is unset, the key
    ///   file cannot be read or it names no project
    /// * `RelayError::StoreError` when the configured store is unreachable
    pub async fn new(config: Arc<AppConfig>) -> Result<Self, RelayError> {
        let credentials = ServiceAccountCredentials::from_config(&config.firebase)?;
        let project_id = credentials.verify().await?;
        info!(
            project_id = %project_id,
            key_path = %credentials.key_path().display(),
            "Service account key loaded"
        );

        let identity = Arc::new(ServiceAccountIdentityIssuer::new(credentials.key_path()));
        let store = StoreFactory::new().from_app_config(&config).await?;

        Self::from_parts(&config, store, Arc::new(credentials), identity)
    }

    /// Wire the workflow from already constructed parts.
    pub fn from_parts(
        config: &AppConfig,
        store: TokenStore,
        credentials: Arc<dyn CredentialSource>,
        identity: Arc<dyn IdentityTokenIssuer>,
    ) -> Result<Self, RelayError> {
        let client = Arc::new(FcmClient::from_config(config, credentials)?);
        let workflow = TokenWorkflow::new(store.clone(), client.clone(), client, identity);
        Ok(Self { store, workflow })
    }

    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    pub fn workflow(&self) -> TokenWorkflow {
        self.workflow.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pushrelay_config::StoreBackendKind;

    #[tokio::test]
    async fn test_missing_key_path_is_fatal() {
        let mut config = AppConfig::default();
        config.store.backend = StoreBackendKind::Memory;

        let result = PushRelayServiceFactory::new(Arc::new(config)).await;
        assert!(matches!(result, Err(RelayError::ConfigError(_))));
    }

    #[tokio::test]
    async fn test_unreadable_key_file_is_fatal() {
        let mut config = AppConfig::default();
        config.store.backend = StoreBackendKind::Memory;
        config.firebase.key_path = Some("/nonexistent/service-account.json".to_string());

        let result = PushRelayServiceFactory::new(Arc::new(config)).await;
        assert!(matches!(result, Err(RelayError::ConfigError(_))));
    }
}
