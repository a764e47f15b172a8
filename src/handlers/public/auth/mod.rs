// handlers/public/auth/mod.rs - Public authentication handlers
//
// Token acquisition endpoints that do not require authentication.

use std::sync::Arc;

use serde::Serialize;

use crate::auth::CredentialVerifier;
use crate::database::models::User;
use crate::error::ApiError;

pub mod login; // POST /api/auth/login - authenticate and get a session token
pub mod register; // POST /api/auth/register - create a new account

pub use login::login_post;
pub use register::register_post;

/// Body returned by both register and login.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub user: User,
}

// Argon2 is deliberately slow; keep it off the async workers.
async fn hash_password(
    credentials: Arc<dyn CredentialVerifier>,
    password: String,
) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || credentials.hash(&password))
        .await
        .map_err(|e| {
            tracing::error!("Password hashing task failed: {}", e);
            ApiError::internal_server_error("internal error")
        })?
        .map_err(ApiError::from)
}

async fn verify_password(
    credentials: Arc<dyn CredentialVerifier>,
    password: String,
    digest: String,
) -> Result<bool, ApiError> {
    tokio::task::spawn_blocking(move || credentials.verify(&password, &digest))
        .await
        .map_err(|e| {
            tracing::error!("Password verification task failed: {}", e);
            ApiError::internal_server_error("internal error")
        })
}
