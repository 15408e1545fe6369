// --- File: crates/pushrelay_common/src/lib.rs ---

pub mod error; // Error taxonomy and status mapping
pub mod http; // HTTP utilities
pub mod logging; // Logging utilities
pub mod models; // Data structures and models
pub mod routes; // Route definitions
pub mod services; // Service abstractions

// Re-export the routes function to be used by the main backend service
pub use routes::routes;

// Re-export error types and utilities for easier access
pub use error::{config_error, not_found, validation_error, Context, HttpStatusCode, RelayError};

// Re-export HTTP utilities for easier access
pub use http::{client::create_client, json_body, IntoHttpResponse};

pub use models::{DeviceInfo, DeviceTokenRecord, InvalidPlatform, Platform};
pub use services::BoxFuture;
