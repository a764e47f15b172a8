// handlers/protected/auth/whoami.rs - GET /api/auth/me handler

use crate::auth::Identity;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /api/auth/me - The identity carried by the presented token.
///
/// Reports the role baked into the token, which can lag behind the user
/// record until the next login.
pub async fn whoami_get(identity: Identity) -> ApiResult<Identity> {
    Ok(ApiResponse::success(identity))
}
