use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};
use serde::{Deserialize, Deserializer};

use super::parse_enum_field;
use crate::access::{lifecycle, TicketPatch};
use crate::app::AppState;
use crate::auth::Identity;
use crate::database::models::Ticket;
use crate::database::DatabaseError;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

/// Merge-patch body: absent, `null` and `""` all keep the current value,
/// except `assigned_to` where `null` unassigns.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTicketRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    #[serde(default, deserialize_with = "present_or_null")]
    pub assigned_to: Option<Option<i64>>,
}

fn present_or_null<'de, D>(deserializer: D) -> Result<Option<Option<i64>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<i64>::deserialize(deserializer).map(Some)
}

impl UpdateTicketRequest {
    /// Parses the body. Without `staff`, `status` and `assigned_to` are
    /// dropped unread, so bad values there cannot fail an owner's edit.
    pub fn into_patch(self, staff: bool) -> Result<TicketPatch, ApiError> {
        let (status, assigned_to) = if staff {
            (parse_enum_field("status", self.status)?, self.assigned_to)
        } else {
            (None, None)
        };

        Ok(TicketPatch {
            title: self.title,
            description: self.description,
            priority: parse_enum_field("priority", self.priority)?,
            status,
            assigned_to,
        })
    }
}

/**
 * PUT /api/tickets/:id - Update a ticket
 *
 * Checks run in a fixed order and stop at the first failure:
 * 404 unknown ticket, 403 not the owner, 403 owner on a non-open ticket,
 * 400 malformed body, 400 unknown assignee. Nothing is written before all
 * of them pass.
 */
pub async fn ticket_update(
    State(state): State<AppState>,
    identity: Identity,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateTicketRequest>, JsonRejection>,
) -> ApiResult<Ticket> {
    let Path(id) = id?;

    let ticket = state.stores.tickets.get_by_id(id).await?;
    let grant = lifecycle::authorize_update(&identity, &ticket)?;

    let Json(request) = payload?;
    let changes = lifecycle::plan_update(grant, request.into_patch(grant.is_staff())?);

    if let Some(assignee) = changes.assigned_to.filter(|a| Some(*a) != ticket.assigned_to) {
        match state.stores.users.get_by_id(assignee).await {
            Ok(_) => {}
            Err(DatabaseError::NotFound(_)) => {
                return Err(ApiError::invalid_field("assigned_to", "user does not exist"));
            }
            Err(e) => return Err(e.into()),
        }
    }

    // TODO: wrap the read above and this write in one transaction so a
    // concurrent edit cannot slip between the authorization check and the write.
    let updated = state.stores.tickets.update(id, &changes).await?;

    tracing::info!(
        ticket_id = id,
        user_id = identity.user_id,
        role = %identity.role,
        status = %updated.status,
        "ticket updated"
    );
    Ok(ApiResponse::success(updated))
}
