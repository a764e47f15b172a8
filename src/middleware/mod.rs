pub mod auth;
pub mod response;

pub use auth::{authenticate, require_roles};
pub use response::{ApiResponse, ApiResult};
