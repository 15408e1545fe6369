//! Logging utilities for the pushrelay service.
//!
//! Installs the global `tracing` subscriber. `RUST_LOG` takes precedence;
//! otherwise the configured level applies to the whole process.

use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber with a specific default level.
///
/// `level` is any `EnvFilter` directive string, e.g. `"debug"` or
/// `"info,pushrelay_store=debug"`. Calling this twice is harmless; the second
/// call leaves the first subscriber in place.
pub fn init_with_level(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let result = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true),
        )
        .with(filter)
        .try_init();

    if result.is_ok() {
        info!("Logging initialized at level: {}", level);
    }
}
