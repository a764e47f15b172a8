use axum::extract::{rejection::PathRejection, Path, State};

use crate::app::AppState;
use crate::auth::Identity;
use crate::middleware::{ApiResponse, ApiResult};

/// DELETE /api/users/:id - Removes the account with its tickets and comments.
pub async fn user_delete(
    State(state): State<AppState>,
    identity: Identity,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<()> {
    let Path(id) = id?;

    state.stores.users.delete(id).await?;

    tracing::info!(user_id = id, deleted_by = identity.user_id, "user deleted");
    Ok(ApiResponse::no_content())
}
