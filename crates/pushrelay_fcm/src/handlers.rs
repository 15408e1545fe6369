//! HTTP handlers for the token registry and notification relay
//!
//! Handlers only unwrap the request and hand it to the [`TokenWorkflow`];
//! every failure comes back as a [`RelayError`], which renders itself as a
//! JSON error body with the matching status.

use axum::{
    extract::{rejection::JsonRejection, Json, Path, State},
    http::StatusCode,
};
use pushrelay_common::{json_body, DeviceTokenRecord, RelayError};
use std::sync::Arc;
use tracing::debug;

use crate::models::{
    GenerateTokenRequest, IdentityTokenRequest, IdentityTokenResponse, RegisterTokenRequest,
    SendNotificationRequest, TokenGenerationResult,
};
use crate::workflow::TokenWorkflow;

/// Shared state for the FCM handlers
#[derive(Clone)]
pub struct FcmState {
    pub workflow: TokenWorkflow,
}

/// Issues a custom identity token for a user.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/auth/token",
    request_body = IdentityTokenRequest,
    responses(
        (status = 200, description = "Token issued", body = IdentityTokenResponse),
        (status = 400, description = "Bad Request"),
        (status = 500, description = "Token creation error")
    ),
    tag = "Auth"
))]
pub async fn issue_identity_token_handler(
    State(state): State<Arc<FcmState>>,
    payload: Result<Json<IdentityTokenRequest>, JsonRejection>,
) -> Result<Json<IdentityTokenResponse>, RelayError> {
    let request = json_body(payload)?;
    let custom_token = state
        .workflow
        .issue_identity_token(&request.user_id)
        .await?;
    Ok(Json(IdentityTokenResponse { custom_token }))
}

/// Stores a client-supplied token for `(user_id, platform)`.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/fcm/register",
    request_body = RegisterTokenRequest,
    responses(
        (status = 200, description = "Token stored"),
        (status = 400, description = "Bad Request"),
        (status = 500, description = "Failed to store token")
    ),
    tag = "FCM"
))]
pub async fn register_token_handler(
    State(state): State<Arc<FcmState>>,
    payload: Result<Json<RegisterTokenRequest>, JsonRejection>,
) -> Result<StatusCode, RelayError> {
    let request = json_body(payload)?;
    state
        .workflow
        .register(&request.user_id, &request.platform, &request.token)
        .await?;
    Ok(StatusCode::OK)
}

/// Relays a notification to the token registered for `(user_id, platform)`.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/fcm/send",
    request_body = SendNotificationRequest,
    responses(
        (status = 200, description = "Notification accepted by FCM"),
        (status = 400, description = "Bad Request"),
        (status = 404, description = "Token not found"),
        (status = 500, description = "Failed to send notification")
    ),
    tag = "FCM"
))]
pub async fn send_notification_handler(
    State(state): State<Arc<FcmState>>,
    payload: Result<Json<SendNotificationRequest>, JsonRejection>,
) -> Result<StatusCode, RelayError> {
    let request = json_body(payload)?;
    debug!(user_id = %request.user_id, platform = %request.platform, "Send requested");
    state
        .workflow
        .send(
            &request.user_id,
            &request.platform,
            &request.title,
            &request.body,
        )
        .await?;
    Ok(StatusCode::OK)
}

/// Has FCM issue a token for a device and stores the detailed record.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/fcm/generate",
    request_body = GenerateTokenRequest,
    responses(
        (status = 200, description = "Token generated and stored", body = TokenGenerationResult),
        (status = 400, description = "Invalid device info"),
        (status = 500, description = "Issuance or store failure")
    ),
    tag = "FCM"
))]
pub async fn generate_token_handler(
    State(state): State<Arc<FcmState>>,
    payload: Result<Json<GenerateTokenRequest>, JsonRejection>,
) -> Result<Json<TokenGenerationResult>, RelayError> {
    let request = json_body(payload)?;
    let result = state
        .workflow
        .generate_and_register(request.device_info)
        .await?;
    Ok(Json(result))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/fcm/tokens/{user_id}",
    params(("user_id" = String, Path, description = "User whose devices to list")),
    responses(
        (status = 200, description = "Stored device records", body = [DeviceTokenRecord]),
        (status = 500, description = "Store failure")
    ),
    tag = "FCM"
))]
pub async fn list_tokens_handler(
    State(state): State<Arc<FcmState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<DeviceTokenRecord>>, RelayError> {
    let records = state.workflow.list_user_tokens(&user_id).await?;
    Ok(Json(records))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    delete,
    path = "/fcm/tokens/{user_id}/{platform}/{device_id}",
    params(
        ("user_id" = String, Path, description = "Owner of the device"),
        ("platform" = String, Path, description = "android, ios or web"),
        ("device_id" = String, Path, description = "Device identifier")
    ),
    responses(
        (status = 204, description = "Record removed or already absent"),
        (status = 400, description = "Unknown platform"),
        (status = 500, description = "Store failure")
    ),
    tag = "FCM"
))]
pub async fn delete_token_handler(
    State(state): State<Arc<FcmState>>,
    Path((user_id, platform, device_id)): Path<(String, String, String)>,
) -> Result<StatusCode, RelayError> {
    state
        .workflow
        .delete_device_token(&user_id, &platform, &device_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
