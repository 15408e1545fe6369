use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tracing::info;

use crate::handlers::{
    delete_token_handler, generate_token_handler, issue_identity_token_handler,
    list_tokens_handler, register_token_handler, send_notification_handler, FcmState,
};
use crate::workflow::TokenWorkflow;

/// Create the identity-token and FCM routes
///
/// The workflow is built once by the caller and shared by every request.
pub fn routes(workflow: TokenWorkflow) -> Router {
    let state = Arc::new(FcmState { workflow });

    info!("FCM routes initialized");

    Router::new()
        .route("/auth/token", post(issue_identity_token_handler))
        .route("/fcm/register", post(register_token_handler))
        .route("/fcm/generate", post(generate_token_handler))
        .route("/fcm/send", post(send_notification_handler))
        .route("/fcm/tokens/{user_id}", get(list_tokens_handler))
        .route(
            "/fcm/tokens/{user_id}/{platform}/{device_id}",
            delete(delete_token_handler),
        )
        .with_state(state)
}
