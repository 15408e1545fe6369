//! Firebase Cloud Messaging client module
//!
//! [`FcmClient`] talks to the FCM HTTP v1 API. It issues device tokens
//! through the registrations endpoint and delivers notifications through
//! `messages:send`. Every call fetches fresh credentials from its
//! [`CredentialSource`] and is bounded by the HTTP client's timeout.

use chrono::{DateTime, Duration, Months, Utc};
use pushrelay_common::{create_client, BoxFuture, DeviceInfo};
use pushrelay_config::AppConfig;
use reqwest::{header, Client};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::auth::{CredentialSource, ProviderCredentials};
use crate::error::FirebaseError;
use crate::models::{
    FcmMessage, FcmResponse, Message, Notification, RegistrationDevice, RegistrationRequest,
    RegistrationResponse, TokenGenerationResult,
};
use crate::service::{NotificationDispatcher, TokenIssuer};

const ANDROID_APP_ID: &str = "android:com.example.app";
const IOS_APP_ID: &str = "ios:com.example.app";
const WEB_APP_ID: &str = "web:com.example.app";

/// Provider application id for `platform`.
///
/// Unknown platforms map to the android application.
pub fn app_id_for(platform: &str) -> &'static str {
    match platform {
        "ios" => IOS_APP_ID,
        "web" => WEB_APP_ID,
        _ => ANDROID_APP_ID,
    }
}

/// Expiration of a token generated at `generated_at`: one calendar year later.
pub fn token_expiry(generated_at: DateTime<Utc>) -> DateTime<Utc> {
    generated_at
        .checked_add_months(Months::new(12))
        .unwrap_or(generated_at + Duration::days(365))
}

/// Client for the Firebase Cloud Messaging HTTP v1 API
pub struct FcmClient {
    http: Client,
    base_url: String,
    credentials: Arc<dyn CredentialSource>,
}

impl FcmClient {
    /// `base_url` is the API origin, e.g. `https://fcm.googleapis.com`.
    pub fn new(
        http: Client,
        base_url: impl Into<String>,
        credentials: Arc<dyn CredentialSource>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            credentials,
        }
    }

    /// Builds a client with the configured API origin and HTTP timeout.
    pub fn from_config(
        config: &AppConfig,
        credentials: Arc<dyn CredentialSource>,
    ) -> Result<Self, FirebaseError> {
        let http = create_client(config.http.timeout_secs, true)?;
        Ok(Self::new(
            http,
            config.firebase.api_base_url.clone(),
            credentials,
        ))
    }

    fn project_url(&self, project_id: &str, endpoint: &str) -> String {
        format!("{}/v1/projects/{}/{}", self.base_url, project_id, endpoint)
    }

    /// POSTs `body` with the bearer token and returns the 2xx response text.
    async fn post_authorized<T: Serialize>(
        &self,
        credentials: &ProviderCredentials,
        url: &str,
        body: &T,
    ) -> Result<String, FirebaseError> {
        let response = self
            .http
            .post(url)
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", credentials.access_token),
            )
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            error!(url = %url, status = status.as_u16(), "FCM request failed");
            return Err(FirebaseError::ApiError {
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(text)
    }

    /// Asks the provider for a delivery token for `device_info`.
    ///
    /// The device info is expected to be validated already; an unknown
    /// platform is registered against the android application.
    ///
    /// # Errors
    ///
    /// * credential loading or exchange failures
    /// * `FirebaseError::ApiError` with the provider's status and body on non-2xx
    /// * `FirebaseError::InvalidResponse` when the answer carries no token
    pub async fn register_device(
        &self,
        device_info: &DeviceInfo,
    ) -> Result<TokenGenerationResult, FirebaseError> {
        let credentials = self.credentials.credentials().await?;
        let url = self.project_url(&credentials.project_id, "registrations");

        let request = RegistrationRequest {
            application: format!(
                "projects/{}/apps/{}",
                credentials.project_id,
                app_id_for(&device_info.platform)
            ),
            device: RegistrationDevice {
                device_model: &device_info.device_model,
                os_version: &device_info.os_version,
                app_version: &device_info.app_version,
                device_id: &device_info.device_id,
                installation_id: &device_info.installation_id,
            },
        };

        let text = self.post_authorized(&credentials, &url, &request).await?;
        let response: RegistrationResponse = serde_json::from_str(&text)
            .map_err(|e| FirebaseError::InvalidResponse(format!("registration: {}", e)))?;
        if response.token.is_empty() {
            return Err(FirebaseError::InvalidResponse(
                "registration returned an empty token".to_string(),
            ));
        }

        let generated_at = Utc::now();
        info!(
            user_id = %device_info.user_id,
            platform = %device_info.platform,
            device_id = %device_info.device_id,
            "Issued FCM token"
        );
        Ok(TokenGenerationResult {
            token: response.token,
            device_info: device_info.clone(),
            generated_at,
            expires_at: token_expiry(generated_at),
        })
    }

    /// Sends a titled notification to one delivery token. No retry.
    ///
    /// Returns the provider's message name when the response carries one.
    pub async fn send_message(
        &self,
        token: &str,
        title: &str,
        body: &str,
    ) -> Result<Option<String>, FirebaseError> {
        let credentials = self.credentials.credentials().await?;
        let url = self.project_url(&credentials.project_id, "messages:send");

        let message = FcmMessage {
            message: Message {
                token,
                notification: Notification { title, body },
            },
        };

        let text = self.post_authorized(&credentials, &url, &message).await?;
        let name = serde_json::from_str::<FcmResponse>(&text)
            .ok()
            .and_then(|response| response.name);
        debug!(message_name = ?name, "FCM accepted notification");
        Ok(name)
    }
}

impl TokenIssuer for FcmClient {
    fn generate_token(
        &self,
        device_info: &DeviceInfo,
    ) -> BoxFuture<'_, TokenGenerationResult, FirebaseError> {
        let device_info = device_info.clone();
        Box::pin(async move { self.register_device(&device_info).await })
    }
}

impl NotificationDispatcher for FcmClient {
    fn send(
        &self,
        token: &str,
        title: &str,
        body: &str,
    ) -> BoxFuture<'_, Option<String>, FirebaseError> {
        let (token, title, body) = (token.to_string(), title.to_string(), body.to_string());
        Box::pin(async move { self.send_message(&token, &title, &body).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticCredentials;
    use chrono::TimeZone;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> FcmClient {
        FcmClient::new(
            Client::new(),
            format!("{}/", base_url),
            Arc::new(StaticCredentials::new("test-bearer", "proj")),
        )
    }

    fn device(platform: &str) -> DeviceInfo {
        DeviceInfo {
            user_id: "u1".to_string(),
            platform: platform.to_string(),
            device_model: "iPhone 15".to_string(),
            os_version: "iOS 17.4".to_string(),
            app_version: "1.0.0".to_string(),
            device_id: "dev-1".to_string(),
            installation_id: "inst-1".to_string(),
        }
    }

    #[test]
    fn test_app_id_table_falls_back_to_android() {
        assert_eq!(app_id_for("android"), "android:com.example.app");
        assert_eq!(app_id_for("ios"), "ios:com.example.app");
        assert_eq!(app_id_for("web"), "web:com.example.app");
        assert_eq!(app_id_for("windows"), "android:com.example.app");
        assert_eq!(app_id_for(""), "android:com.example.app");
    }

    #[test]
    fn test_token_expiry_is_one_calendar_year() {
        let generated = Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap();
        assert_eq!(
            token_expiry(generated),
            Utc.with_ymd_and_hms(2025, 2, 28, 12, 0, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn test_register_device_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/projects/proj/registrations"))
            .and(header("authorization", "Bearer test-bearer"))
            .and(body_json(json!({
                "application": "projects/proj/apps/ios:com.example.app",
                "device": {
                    "device_model": "iPhone 15",
                    "os_version": "iOS 17.4",
                    "app_version": "1.0.0",
                    "device_id": "dev-1",
                    "installation_id": "inst-1"
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "issued-1"})))
            .expect(1)
            .mount(&server)
            .await;

        let result = test_client(&server.uri())
            .register_device(&device("ios"))
            .await
            .unwrap();
        assert_eq!(result.token, "issued-1");
        assert_eq!(result.device_info, device("ios"));
        assert!(result.expires_at > result.generated_at);
    }

    #[tokio::test]
    async fn test_register_device_unknown_platform_uses_android_app() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/projects/proj/registrations"))
            .and(body_json(json!({
                "application": "projects/proj/apps/android:com.example.app",
                "device": {
                    "device_model": "iPhone 15",
                    "os_version": "iOS 17.4",
                    "app_version": "1.0.0",
                    "device_id": "dev-1",
                    "installation_id": "inst-1"
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "issued-2"})))
            .expect(1)
            .mount(&server)
            .await;

        let result = test_client(&server.uri())
            .register_device(&device("symbian"))
            .await
            .unwrap();
        assert_eq!(result.token, "issued-2");
    }

    #[tokio::test]
    async fn test_register_device_provider_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/projects/proj/registrations"))
            .respond_with(ResponseTemplate::new(403).set_body_string("PERMISSION_DENIED"))
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .register_device(&device("web"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            FirebaseError::ApiError { status: 403, ref body } if body == "PERMISSION_DENIED"
        ));
    }

    #[tokio::test]
    async fn test_register_device_missing_token_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": ""})))
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .register_device(&device("android"))
            .await
            .unwrap_err();
        assert!(matches!(err, FirebaseError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_send_message_posts_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/projects/proj/messages:send"))
            .and(header("authorization", "Bearer test-bearer"))
            .and(body_json(json!({
                "message": {"token": "T1", "notification": {"title": "Hello", "body": "World"}}
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"name": "projects/proj/messages/42"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let name = test_client(&server.uri())
            .send("T1", "Hello", "World")
            .await
            .unwrap();
        assert_eq!(name.as_deref(), Some("projects/proj/messages/42"));
    }

    #[tokio::test]
    async fn test_send_message_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/projects/proj/messages:send"))
            .respond_with(ResponseTemplate::new(404).set_body_string("UNREGISTERED"))
            .expect(1)
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .send_message("stale", "t", "b")
            .await
            .unwrap_err();
        assert!(matches!(err, FirebaseError::ApiError { status: 404, .. }));
    }
}
