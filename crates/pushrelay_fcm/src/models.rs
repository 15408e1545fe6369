//! Request, response and wire models for the FCM routes and provider calls

use chrono::{DateTime, Utc};
use pushrelay_common::DeviceInfo;
use serde::{Deserialize, Serialize};

pub use pushrelay_common::{DeviceTokenRecord, Platform};

/// Body of `POST /auth/token`
#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct IdentityTokenRequest {
    pub user_id: String,
}

/// Response of `POST /auth/token`
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct IdentityTokenResponse {
    pub custom_token: String,
}

/// Body of `POST /fcm/register`
#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RegisterTokenRequest {
    pub user_id: String,
    pub platform: String,
    pub token: String,
}

/// Body of `POST /fcm/send`
#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SendNotificationRequest {
    pub user_id: String,
    pub platform: String,
    pub title: String,
    pub body: String,
}

/// Body of `POST /fcm/generate`
#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct GenerateTokenRequest {
    pub device_info: DeviceInfo,
}

/// A token issued by the provider, with the device it was issued for.
///
/// Also the response of `POST /fcm/generate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TokenGenerationResult {
    pub token: String,
    pub device_info: DeviceInfo,
    pub generated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Provider registration call body.
#[derive(Debug, Serialize)]
pub(crate) struct RegistrationRequest<'a> {
    pub application: String,
    pub device: RegistrationDevice<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RegistrationDevice<'a> {
    pub device_model: &'a str,
    pub os_version: &'a str,
    pub app_version: &'a str,
    pub device_id: &'a str,
    pub installation_id: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RegistrationResponse {
    pub token: String,
}

/// Provider send call body: `{message: {token, notification: {title, body}}}`.
#[derive(Debug, Serialize)]
pub(crate) struct FcmMessage<'a> {
    pub message: Message<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct Message<'a> {
    pub token: &'a str,
    pub notification: Notification<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct Notification<'a> {
    pub title: &'a str,
    pub body: &'a str,
}

/// Provider send response; `name` is `projects/<p>/messages/<id>`.
#[derive(Debug, Deserialize)]
pub(crate) struct FcmResponse {
    #[serde(default)]
    pub name: Option<String>,
}
