use axum::extract::State;

use crate::app::AppState;
use crate::database::models::User;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /api/users - Every account, without password digests.
pub async fn user_list(State(state): State<AppState>) -> ApiResult<Vec<User>> {
    let users = state.stores.users.list().await?;
    Ok(ApiResponse::success(users))
}
