// handlers/public/auth/login.rs - POST /api/auth/login handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;

use super::{verify_password, TokenResponse};
use crate::app::AppState;
use crate::auth::Identity;
use crate::database::DatabaseError;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/**
 * POST /api/auth/login - Authenticate and receive a session token
 *
 * Input: `{ "email", "password" }`
 * Output: `{ "token": "...", "user": { ... } }`
 *
 * Unknown email and wrong password produce the same 401. The token carries
 * the role stored at this moment.
 */
pub async fn login_post(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<TokenResponse> {
    let Json(request) = payload?;

    let mut user = match state.stores.users.get_by_email(&request.email).await {
        Ok(user) => user,
        Err(DatabaseError::NotFound(_)) => {
            tracing::info!("Login failed: unknown email");
            return Err(ApiError::unauthorized("invalid credentials"));
        }
        Err(e) => return Err(e.into()),
    };

    let digest = std::mem::take(&mut user.password_hash);
    if !verify_password(state.credentials.clone(), request.password, digest).await? {
        tracing::info!(user_id = user.id, "Login failed: wrong password");
        return Err(ApiError::unauthorized("invalid credentials"));
    }

    let token = state.tokens.issue(&Identity::new(user.id, user.role))?;
    tracing::debug!(user_id = user.id, role = %user.role, "login succeeded");

    Ok(ApiResponse::success(TokenResponse { token, user }))
}
