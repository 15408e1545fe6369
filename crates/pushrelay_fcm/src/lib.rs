//! Firebase Cloud Messaging token registry and notification relay
//!
//! This crate issues identity tokens, registers device tokens and relays
//! notifications through the FCM HTTP v1 API, persisting tokens through
//! [`pushrelay_store::TokenStore`].
//!
//! # Features
//!
//! - Service-account authentication against Google OAuth2 (`yup-oauth2`)
//! - Server-side device token issuance via the FCM registrations endpoint
//! - Legacy client-supplied token registration and notification relay
//! - RS256 custom identity tokens (`jsonwebtoken`)
//! - OpenAPI/Swagger documentation (with the `openapi` feature)
//!
//! # Example
//!
//! ```rust,no_run
//! use pushrelay_fcm::{routes, TokenWorkflow};
//!
//! fn setup_app(workflow: TokenWorkflow) -> axum::Router {
//!     routes(workflow)
//! }
//! ```
//!
//! # API Endpoints
//!
//! - `POST /auth/token` - Issue a custom identity token
//! - `POST /fcm/register` - Store a client-supplied token
//! - `POST /fcm/generate` - Issue and store a token for a device
//! - `POST /fcm/send` - Relay a notification to a registered token
//! - `GET /fcm/tokens/{user_id}` - List a user's device records
//! - `DELETE /fcm/tokens/{user_id}/{platform}/{device_id}` - Remove a device record

pub mod auth;
pub mod client;
#[cfg(feature = "openapi")]
pub mod doc;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod models;
pub mod routes;
pub mod service;
pub mod workflow;

pub use auth::{CredentialSource, ServiceAccountCredentials, StaticCredentials};
pub use client::FcmClient;
pub use error::FirebaseError;
pub use identity::ServiceAccountIdentityIssuer;
pub use routes::routes;
pub use service::{IdentityTokenIssuer, NotificationDispatcher, TokenIssuer};
pub use workflow::{validate_device_info, TokenWorkflow};

#[cfg(feature = "openapi")]
pub mod openapi {
    pub use crate::doc::FcmApiDoc;
}
