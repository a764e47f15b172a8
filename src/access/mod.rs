// Access control: role allow-sets for routes, ownership and lifecycle rules
// for the resources behind them.

pub mod lifecycle;
pub mod resource;
pub mod role;

use thiserror::Error;

pub use lifecycle::{authorize_update, plan_update, TicketPatch, UpdateGrant};
pub use resource::{authorize, owner_scope, Owned};
pub use role::{InvalidRole, Role, RoleSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("forbidden")]
    RoleNotAllowed,

    #[error("forbidden")]
    NotOwner,

    #[error("can only edit open tickets")]
    TicketNotOpen,
}
