use axum::extract::{rejection::PathRejection, Path, State};

use crate::access;
use crate::app::AppState;
use crate::auth::Identity;
use crate::database::models::Ticket;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /api/tickets - Staff see every ticket, users only their own.
pub async fn ticket_list(State(state): State<AppState>, identity: Identity) -> ApiResult<Vec<Ticket>> {
    let tickets = state
        .stores
        .tickets
        .list(access::owner_scope(&identity))
        .await?;
    Ok(ApiResponse::success(tickets))
}

/// GET /api/tickets/:id
pub async fn ticket_get(
    State(state): State<AppState>,
    identity: Identity,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Ticket> {
    let Path(id) = id?;

    let ticket = state.stores.tickets.get_by_id(id).await?;
    access::authorize(&identity, &ticket)?;

    Ok(ApiResponse::success(ticket))
}
