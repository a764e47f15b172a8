use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;

use super::parse_enum_field;
use crate::access::lifecycle;
use crate::app::AppState;
use crate::auth::Identity;
use crate::database::models::{NewTicket, Ticket};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct CreateTicketRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
}

/// POST /api/tickets - Open a ticket authored by the caller.
pub async fn ticket_create(
    State(state): State<AppState>,
    identity: Identity,
    payload: Result<Json<CreateTicketRequest>, JsonRejection>,
) -> ApiResult<Ticket> {
    let Json(request) = payload?;

    let title = request.title.unwrap_or_default();
    let description = request.description.unwrap_or_default();
    if title.is_empty() || description.is_empty() {
        return Err(ApiError::bad_request("title and description are required"));
    }
    let priority = lifecycle::initial_priority(parse_enum_field("priority", request.priority)?);

    let ticket = state
        .stores
        .tickets
        .create(NewTicket {
            title,
            description,
            priority,
            author_id: identity.user_id,
        })
        .await?;

    tracing::info!(ticket_id = ticket.id, author_id = identity.user_id, "ticket created");
    Ok(ApiResponse::created(ticket))
}
