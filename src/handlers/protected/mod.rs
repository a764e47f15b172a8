// handlers/protected/mod.rs - Protected handlers (session token required)
//
// Security Level: any authenticated role
// Middleware: `authenticate` puts the caller's `Identity` in the request
// extensions, then `require_roles` with `RoleSet::AUTHENTICATED`; handlers take it as an extractor and apply ownership rules
// through `crate::access`.

pub mod auth; // GET /api/auth/me
pub mod comments; // /api/tickets/:id/comments, /api/comments/:id
pub mod tickets; // /api/tickets, /api/tickets/:id

pub use auth::whoami_get;
pub use comments::{comment_create, comment_delete, comment_list};
pub use tickets::{ticket_create, ticket_delete, ticket_get, ticket_list, ticket_update};
