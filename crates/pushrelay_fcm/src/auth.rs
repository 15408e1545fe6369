//! Authentication module for Firebase Cloud Messaging
//!
//! Provider calls need a bearer token and a project id. Both come from a
//! [`CredentialSource`]; the production source reads a service-account key
//! file and exchanges it for an OAuth2 access token through Google's token
//! endpoint.

use pushrelay_common::BoxFuture;
use pushrelay_config::{
    config_path_to_env_var, FirebaseConfig, LEGACY_FIREBASE_CREDENTIALS_PATH,
};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;
use yup_oauth2::{read_service_account_key, ServiceAccountAuthenticator, ServiceAccountKey};

use crate::error::FirebaseError;

/// OAuth2 scope required by the FCM HTTP v1 API.
pub const FCM_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";

/// What a single provider call needs to authenticate.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderCredentials {
    pub access_token: String,
    pub project_id: String,
}

impl fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderCredentials")
            .field("access_token", &"<redacted>")
            .field("project_id", &self.project_id)
            .finish()
    }
}

/// Source of provider credentials.
pub trait CredentialSource: Send + Sync {
    /// Credentials for one outbound call.
    fn credentials(&self) -> BoxFuture<'_, ProviderCredentials, FirebaseError>;
}

/// Reads a service-account key from disk.
///
/// # Errors
///
/// `FirebaseError::CredentialError` when the file is missing or is not a
/// service-account key.
pub async fn load_service_account_key(path: &Path) -> Result<ServiceAccountKey, FirebaseError> {
    read_service_account_key(path).await.map_err(|e| {
        FirebaseError::CredentialError(format!(
            "cannot read service account key {}: {}",
            path.display(),
            e
        ))
    })
}

/// Project id for provider URLs: a non-empty override wins over the key's.
pub fn resolve_project_id(
    override_id: Option<&str>,
    key: &ServiceAccountKey,
) -> Result<String, FirebaseError> {
    override_id
        .filter(|id| !id.is_empty())
        .or(key.project_id.as_deref())
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            FirebaseError::CredentialError(
                "service account key has no project_id and none is configured".to_string(),
            )
        })
}

/// Service-account backed credentials.
///
/// The key file is read again and a fresh access token is requested on every
/// call; nothing is cached between requests.
#[derive(Debug, Clone)]
pub struct ServiceAccountCredentials {
    key_path: PathBuf,
    project_id: Option<String>,
}

impl ServiceAccountCredentials {
    pub fn new(key_path: impl Into<PathBuf>, project_id: Option<String>) -> Self {
        Self {
            key_path: key_path.into(),
            project_id,
        }
    }

    /// Builds credentials from the `firebase` config section.
    ///
    /// # Errors
    ///
    /// `FirebaseError::CredentialError` when `key_path` is not configured.
    pub fn from_config(config: &FirebaseConfig) -> Result<Self, FirebaseError> {
        let key_path = config
            .key_path
            .as_deref()
            .filter(|path| !path.is_empty())
            .ok_or_else(|| {
                FirebaseError::CredentialError(format!(
                    "firebase.key_path is not set; set {} or {}",
                    config_path_to_env_var("firebase.key_path"),
                    LEGACY_FIREBASE_CREDENTIALS_PATH
                ))
            })?;
        Ok(Self::new(key_path, config.project_id.clone()))
    }

    pub fn key_path(&self) -> &Path {
        &self.key_path
    }

    /// Checks that the key file is readable and names a project.
    ///
    /// Returns the resolved project id. Meant for startup, before any request
    /// depends on the file.
    pub async fn verify(&self) -> Result<String, FirebaseError> {
        let key = load_service_account_key(&self.key_path).await?;
        resolve_project_id(self.project_id.as_deref(), &key)
    }
}

impl CredentialSource for ServiceAccountCredentials {
    fn credentials(&self) -> BoxFuture<'_, ProviderCredentials, FirebaseError> {
        Box::pin(async move {
            let key = load_service_account_key(&self.key_path).await?;
            let project_id = resolve_project_id(self.project_id.as_deref(), &key)?;

            let auth = ServiceAccountAuthenticator::builder(key)
                .build()
                .await
                .map_err(|e| FirebaseError::AuthError(e.to_string()))?;
            let token = auth
                .token(&[FCM_SCOPE])
                .await
                .map_err(|e| FirebaseError::AuthError(e.to_string()))?;
            let access_token = token
                .token()
                .ok_or_else(|| FirebaseError::AuthError("No token available".to_string()))?
                .to_string();

            debug!(project_id = %project_id, "Obtained FCM access token");
            Ok(ProviderCredentials {
                access_token,
                project_id,
            })
        })
    }
}

/// Fixed credentials, for tests and local runs against an emulator.
#[derive(Debug, Clone)]
pub struct StaticCredentials(ProviderCredentials);

impl StaticCredentials {
    pub fn new(access_token: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self(ProviderCredentials {
            access_token: access_token.into(),
            project_id: project_id.into(),
        })
    }
}

impl CredentialSource for StaticCredentials {
    fn credentials(&self) -> BoxFuture<'_, ProviderCredentials, FirebaseError> {
        let credentials = self.0.clone();
        Box::pin(async move { Ok(credentials) })
    }
}
