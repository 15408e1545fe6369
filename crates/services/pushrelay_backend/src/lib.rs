//! Wiring for the pushrelay HTTP service.

pub mod app_state;
pub mod service_factory;

pub use app_state::AppState;
pub use service_factory::PushRelayServiceFactory;

use pushrelay_common::{Context, RelayError};
use std::future::Future;
use tokio::net::TcpListener;
use tracing::info;

/// Binds `server.host:server.port` and serves until `shutdown` resolves.
pub async fn serve<F>(state: AppState, shutdown: F) -> Result<(), RelayError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!(addr = %addr, store = ?state.config.store.backend, "Starting server");

    axum::serve(listener, state.router())
        .with_graceful_shutdown(shutdown)
        .await
        .context("serving HTTP")?;

    info!("Server stopped");
    Ok(())
}
