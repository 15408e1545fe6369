use utoipa::OpenApi;

use crate::handlers;
use crate::models::{
    DeviceTokenRecord, GenerateTokenRequest, IdentityTokenRequest, IdentityTokenResponse,
    Platform, RegisterTokenRequest, SendNotificationRequest, TokenGenerationResult,
};
use pushrelay_common::DeviceInfo;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::issue_identity_token_handler,
        handlers::register_token_handler,
        handlers::send_notification_handler,
        handlers::generate_token_handler,
        handlers::list_tokens_handler,
        handlers::delete_token_handler,
    ),
    components(
        schemas(
            IdentityTokenRequest,
            IdentityTokenResponse,
            RegisterTokenRequest,
            SendNotificationRequest,
            GenerateTokenRequest,
            TokenGenerationResult,
            DeviceInfo,
            DeviceTokenRecord,
            Platform,
        )
    ),
    tags(
        (name = "Auth", description = "Custom identity tokens"),
        (name = "FCM", description = "Device token registry and notification relay")
    )
)]
pub struct FcmApiDoc;
