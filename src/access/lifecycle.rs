//! Ticket lifecycle: which fields a caller may change, and in which state.
//!
//! Status may move between any two values, but only for staff. Staff are
//! never locked out of a closed ticket. A `User` may edit their own ticket
//! while it is open, limited to title, description and priority.
//!
//! Updates are merge-patches: an absent or empty field keeps the current
//! value, and that includes `status`.

use super::{resource, AccessError};
use crate::auth::Identity;
use crate::database::models::{Ticket, TicketChanges, TicketPriority, TicketStatus};

/// Requested ticket changes after parsing, before any rule is applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TicketPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<TicketPriority>,
    pub status: Option<TicketStatus>,
    /// `Some(None)` unassigns.
    pub assigned_to: Option<Option<i64>>,
}

/// Priority for a new ticket.
pub fn initial_priority(requested: Option<TicketPriority>) -> TicketPriority {
    requested.unwrap_or_default()
}

pub const INITIAL_STATUS: TicketStatus = TicketStatus::Open;

/// Proof that [`authorize_update`] passed for one caller and one ticket.
#[derive(Debug, Clone, Copy)]
pub struct UpdateGrant<'a> {
    identity: &'a Identity,
    ticket: &'a Ticket,
}

impl UpdateGrant<'_> {
    /// Whether the caller may change `status` and `assigned_to`.
    pub fn is_staff(&self) -> bool {
        self.identity.is_staff()
    }
}

/// Ownership and open-state checks, done before the body is even looked at.
pub fn authorize_update<'a>(identity: &'a Identity, ticket: &'a Ticket) -> Result<UpdateGrant<'a>, AccessError> {
    resource::authorize(identity, ticket)?;

    if !identity.is_staff() && ticket.status != TicketStatus::Open {
        tracing::debug!(
            user_id = identity.user_id,
            ticket_id = ticket.id,
            status = %ticket.status,
            "owner edit rejected on non-open ticket"
        );
        return Err(AccessError::TicketNotOpen);
    }
    Ok(UpdateGrant { identity, ticket })
}

/// Resolves the full set of stored values for an authorized update.
///
/// Fields a caller may not touch are kept as they are without an error:
/// a `User` submitting `status` or `assigned_to` gets the current values.
pub fn plan_update(grant: UpdateGrant<'_>, patch: TicketPatch) -> TicketChanges {
    let ticket = grant.ticket;
    let staff = grant.is_staff();
    TicketChanges {
        title: keep_if_empty(patch.title, &ticket.title),
        description: keep_if_empty(patch.description, &ticket.description),
        priority: patch.priority.unwrap_or(ticket.priority),
        status: match patch.status {
            Some(status) if staff => status,
            _ => ticket.status,
        },
        assigned_to: match patch.assigned_to {
            Some(assignee) if staff => assignee,
            _ => ticket.assigned_to,
        },
    }
}

fn keep_if_empty(requested: Option<String>, current: &str) -> String {
    match requested {
        Some(value) if !value.is_empty() => value,
        _ => current.to_string(),
    }
}
