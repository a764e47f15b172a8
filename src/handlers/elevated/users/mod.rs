// handlers/elevated/users/mod.rs - User administration handlers
//
// Admin-only. Role changes take effect at the target's next login; tokens
// already issued keep the role they were signed with until they expire.

pub mod delete; // DELETE /api/users/:id
pub mod list; //   GET    /api/users
pub mod role; //   PUT    /api/users/:id/role

pub use delete::user_delete;
pub use list::user_list;
pub use role::user_role_put;
