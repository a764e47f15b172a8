// handlers/elevated/users/role.rs - PUT /api/users/:id/role handler

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};
use serde::{Deserialize, Serialize};

use crate::access::Role;
use crate::app::AppState;
use crate::auth::Identity;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    #[serde(default)]
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct StatusBody {
    pub status: &'static str,
}

/**
 * PUT /api/users/:id/role - Change a user's role
 *
 * Input: `{ "role": "admin" | "operator" | "user" }`
 * Output: `{ "status": "ok" }`
 *
 * The target is not looked up first; an unknown id is a silent no-op.
 */
pub async fn user_role_put(
    State(state): State<AppState>,
    identity: Identity,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateRoleRequest>, JsonRejection>,
) -> ApiResult<StatusBody> {
    let Path(id) = id?;
    let Json(request) = payload?;

    let role: Role = request
        .role
        .parse()
        .map_err(|_| ApiError::bad_request("invalid role"))?;

    state.stores.users.update_role(id, role).await?;

    tracing::info!(user_id = id, role = %role, changed_by = identity.user_id, "user role changed");
    Ok(ApiResponse::success(StatusBody { status: "ok" }))
}
