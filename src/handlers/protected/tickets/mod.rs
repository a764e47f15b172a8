// handlers/protected/tickets/mod.rs - Ticket endpoints
//
// Every handler loads the ticket first, then asks the access module whether
// the caller may see or change it.

use std::str::FromStr;

use crate::database::models::InvalidEnumValue;
use crate::error::ApiError;

pub mod create; // POST   /api/tickets
pub mod delete; // DELETE /api/tickets/:id (admin)
pub mod read; //   GET    /api/tickets, /api/tickets/:id
pub mod update; // PUT    /api/tickets/:id

pub use create::ticket_create;
pub use delete::ticket_delete;
pub use read::{ticket_get, ticket_list};
pub use update::ticket_update;

/// Parses an optional enum field where `""` means "not given".
pub(crate) fn parse_enum_field<T>(field: &str, value: Option<String>) -> Result<Option<T>, ApiError>
where
    T: FromStr<Err = InvalidEnumValue>,
{
    match value.as_deref() {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|e: InvalidEnumValue| ApiError::invalid_field(field, e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{TicketPriority, TicketStatus};

    #[test]
    fn empty_means_absent() {
        assert_eq!(parse_enum_field::<TicketStatus>("status", None).unwrap(), None);
        assert_eq!(parse_enum_field::<TicketStatus>("status", Some(String::new())).unwrap(), None);
    }

    #[test]
    fn known_values_parse() {
        assert_eq!(
            parse_enum_field::<TicketPriority>("priority", Some("critical".to_string())).unwrap(),
            Some(TicketPriority::Critical)
        );
    }

    #[test]
    fn unknown_value_is_invalid_input() {
        let err = parse_enum_field::<TicketStatus>("status", Some("done".to_string())).unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert_eq!(err.to_json()["field_errors"]["status"], "invalid status: done");
    }
}
