use axum::extract::{rejection::PathRejection, Path, State};

use crate::app::AppState;
use crate::auth::Identity;
use crate::middleware::{ApiResponse, ApiResult};

/// DELETE /api/tickets/:id - Admin only; comments go with the ticket.
pub async fn ticket_delete(
    State(state): State<AppState>,
    identity: Identity,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<()> {
    let Path(id) = id?;

    state.stores.tickets.delete(id).await?;

    tracing::info!(ticket_id = id, deleted_by = identity.user_id, "ticket deleted");
    Ok(ApiResponse::no_content())
}
