// handlers/public/auth/register.rs - POST /api/auth/register handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;

use super::{hash_password, TokenResponse};
use crate::access::Role;
use crate::app::AppState;
use crate::auth::Identity;
use crate::database::models::NewUser;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    /// Accepted for compatibility; never honoured.
    #[serde(default)]
    pub role: Option<String>,
}

/**
 * POST /api/auth/register - Create an account and start a session
 *
 * Input: `{ "username", "email", "password", "role"? }`
 * Output (201): `{ "token": "...", "user": { id, username, email, role, created_at } }`
 *
 * The stored role is always `user`, whatever was requested.
 */
pub async fn register_post(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<TokenResponse> {
    let Json(request) = payload?;

    if request.username.is_empty() || request.email.is_empty() || request.password.is_empty() {
        return Err(ApiError::bad_request("username, email and password are required"));
    }

    let role = Role::for_registration(request.role.as_deref());
    let password_hash = hash_password(state.credentials.clone(), request.password).await?;

    let user = state
        .stores
        .users
        .create(NewUser {
            username: request.username,
            email: request.email,
            password_hash,
            role,
        })
        .await
        .map_err(|e| {
            tracing::warn!("Registration failed: {}", e);
            ApiError::conflict("user already exists or invalid data")
        })?;

    let token = state.tokens.issue(&Identity::new(user.id, user.role))?;
    tracing::info!(user_id = user.id, "registered new user");

    Ok(ApiResponse::created(TokenResponse { token, user }))
}
