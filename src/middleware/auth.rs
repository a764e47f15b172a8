use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::access::{AccessError, RoleSet};
use crate::auth::{Identity, TokenCodec};
use crate::error::ApiError;

/// Verifies the bearer token and attaches the caller's [`Identity`] to the request.
///
/// A missing header, a non-Bearer scheme and a bad token all end in the same
/// 401.
pub async fn authenticate(
    State(tokens): State<Arc<TokenCodec>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(request.headers()).map_err(|msg| {
        tracing::debug!("Authentication failed: {}", msg);
        ApiError::unauthorized("unauthorized")
    })?;

    let identity = tokens.verify(token)?;
    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}

/// Rejects callers whose role is not in the allow-set given as state.
///
/// Layered inside [`authenticate`]; stacking several of these intersects them.
pub async fn require_roles(
    State(allowed): State<RoleSet>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let identity = request
        .extensions()
        .get::<Identity>()
        .copied()
        .ok_or_else(|| ApiError::unauthorized("unauthorized"))?;

    if !allowed.contains(identity.role) {
        tracing::warn!(
            user_id = identity.user_id,
            role = %identity.role,
            allowed = ?allowed,
            path = %request.uri().path(),
            "route access denied"
        );
        return Err(AccessError::RoleNotAllowed.into());
    }

    Ok(next.run(request).await)
}

/// Extract the token from an `Authorization: Bearer <token>` header
fn extract_bearer(headers: &HeaderMap) -> Result<&str, &'static str> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or("missing Authorization header")?
        .to_str()
        .map_err(|_| "invalid Authorization header")?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or("Authorization header must use Bearer scheme")?
        .trim();

    if token.is_empty() {
        return Err("empty bearer token");
    }
    Ok(token)
}
