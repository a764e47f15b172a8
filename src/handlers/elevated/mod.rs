// handlers/elevated/mod.rs - Elevated handlers (admin role required)
//
// Security Level: `RoleSet::ADMIN`
// Middleware: `authenticate` then `require_roles`, applied as route layers so
// an unknown path still answers 404 rather than 401.

pub mod users; // User administration

pub use users::{user_delete, user_list, user_role_put};
