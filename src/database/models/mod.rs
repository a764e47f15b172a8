pub mod comment;
pub mod ticket;
pub mod user;

pub use comment::Comment;
pub use ticket::{InvalidEnumValue, NewTicket, Ticket, TicketChanges, TicketPriority, TicketStatus};
pub use user::{NewUser, User};
