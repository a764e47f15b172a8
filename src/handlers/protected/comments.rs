// handlers/protected/comments.rs - Comments on tickets
//
// Reading or writing a ticket's comments requires access to the ticket.
// Deleting a comment is a staff moderation action and is guarded by role.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};
use serde::Deserialize;

use crate::access;
use crate::app::AppState;
use crate::auth::Identity;
use crate::database::models::Comment;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    #[serde(default)]
    pub content: String,
}

/// POST /api/tickets/:id/comments
pub async fn comment_create(
    State(state): State<AppState>,
    identity: Identity,
    ticket_id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<CreateCommentRequest>, JsonRejection>,
) -> ApiResult<Comment> {
    let Path(ticket_id) = ticket_id?;

    let ticket = state.stores.tickets.get_by_id(ticket_id).await?;
    access::authorize(&identity, &ticket)?;

    let Json(request) = payload?;
    if request.content.is_empty() {
        return Err(ApiError::bad_request("content is required"));
    }

    let comment = state
        .stores
        .comments
        .create(ticket_id, identity.user_id, &request.content)
        .await?;

    tracing::info!(comment_id = comment.id, ticket_id, user_id = identity.user_id, "comment added");
    Ok(ApiResponse::created(comment))
}

/// GET /api/tickets/:id/comments - Oldest first.
pub async fn comment_list(
    State(state): State<AppState>,
    identity: Identity,
    ticket_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Vec<Comment>> {
    let Path(ticket_id) = ticket_id?;

    let ticket = state.stores.tickets.get_by_id(ticket_id).await?;
    access::authorize(&identity, &ticket)?;

    let comments = state.stores.comments.list_by_ticket(ticket_id).await?;
    Ok(ApiResponse::success(comments))
}

/// DELETE /api/comments/:id
pub async fn comment_delete(
    State(state): State<AppState>,
    identity: Identity,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<()> {
    let Path(id) = id?;

    state.stores.comments.delete(id).await?;

    tracing::info!(comment_id = id, deleted_by = identity.user_id, "comment deleted");
    Ok(ApiResponse::no_content())
}
