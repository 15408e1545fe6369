use axum::Router;
use pushrelay_config::AppConfig;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::service_factory::PushRelayServiceFactory;

/// Application state that is shared across all routes.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<PushRelayServiceFactory>,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, services: Arc<PushRelayServiceFactory>) -> Self {
        Self { config, services }
    }

    /// The full HTTP surface with tracing and the whole-request deadline.
    ///
    /// A request that outlives `server.request_timeout_secs` gets a 408 and its
    /// handler future is dropped, which cancels any in-flight store or
    /// provider call.
    pub fn router(&self) -> Router {
        let timeout = Duration::from_secs(self.config.server.request_timeout_secs.max(1));

        #[allow(unused_mut)]
        let mut app = Router::new()
            .merge(pushrelay_common::routes())
            .merge(pushrelay_fcm::routes(self.services.workflow()));

        #[cfg(feature = "openapi")]
        {
            use pushrelay_fcm::openapi::FcmApiDoc;
            use utoipa::OpenApi;
            use utoipa_swagger_ui::SwaggerUi;

            tracing::info!("Adding Swagger UI at /docs");
            app = app.merge(SwaggerUi::new("/docs").url("/docs/openapi.json", FcmApiDoc::openapi()));
        }

        app.layer(TimeoutLayer::new(timeout))
            .layer(TraceLayer::new_for_http())
    }
}
