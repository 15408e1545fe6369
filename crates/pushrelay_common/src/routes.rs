// --- File: crates/pushrelay_common/src/routes.rs ---

use axum::{routing::get, Router};

/// Liveness route shared by every deployment of the service.
pub fn routes() -> Router {
    Router::new().route("/health", get(|| async { "ok" }))
}
