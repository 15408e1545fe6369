//! Custom identity tokens
//!
//! A custom token is an RS256 JWT signed with the service account's private
//! key. Clients trade it for a Firebase session via the Identity Toolkit.

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use pushrelay_common::BoxFuture;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;
use yup_oauth2::ServiceAccountKey;

use crate::auth::load_service_account_key;
use crate::error::FirebaseError;
use crate::service::IdentityTokenIssuer;

/// Audience every Firebase custom token must carry.
pub const IDENTITY_TOOLKIT_AUDIENCE: &str =
    "https://identitytoolkit.googleapis.com/google.identity.identitytoolkit.v1.IdentityToolkit";

/// Longest uid Firebase accepts, in characters.
pub const MAX_UID_CHARS: usize = 128;

const TOKEN_LIFETIME_SECS: i64 = 3600;

#[derive(Debug, Serialize, Deserialize)]
pub struct CustomTokenClaims {
    pub iss: String,
    pub sub: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
    pub uid: String,
}

/// Signs a custom token for `uid` with `key`.
pub fn sign_custom_token(key: &ServiceAccountKey, uid: &str) -> Result<String, FirebaseError> {
    let now = Utc::now();
    let claims = CustomTokenClaims {
        iss: key.client_email.clone(),
        sub: key.client_email.clone(),
        aud: IDENTITY_TOOLKIT_AUDIENCE.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::seconds(TOKEN_LIFETIME_SECS)).timestamp(),
        uid: uid.to_string(),
    };

    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .map_err(|e| FirebaseError::IdentityError(format!("Failed to parse private key: {}", e)))?;

    let mut header = Header::new(Algorithm::RS256);
    header.kid = key.private_key_id.clone();

    encode(&header, &claims, &encoding_key)
        .map_err(|e| FirebaseError::IdentityError(format!("Failed to encode JWT: {}", e)))
}

/// Identity issuer backed by the service-account key file.
///
/// Reads the key on each call, like [`crate::auth::ServiceAccountCredentials`].
#[derive(Debug, Clone)]
pub struct ServiceAccountIdentityIssuer {
    key_path: PathBuf,
}

impl ServiceAccountIdentityIssuer {
    pub fn new(key_path: impl Into<PathBuf>) -> Self {
        Self {
            key_path: key_path.into(),
        }
    }
}

impl IdentityTokenIssuer for ServiceAccountIdentityIssuer {
    fn issue(&self, user_id: &str) -> BoxFuture<'_, String, FirebaseError> {
        let user_id = user_id.to_string();
        Box::pin(async move {
            let key = load_service_account_key(&self.key_path)
                .await
                .map_err(|e| FirebaseError::IdentityError(e.to_string()))?;
            let token = sign_custom_token(&key, &user_id)?;
            debug!(user_id = %user_id, "Issued custom identity token");
            Ok(token)
        })
    }
}
