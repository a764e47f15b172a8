// handlers/protected/auth/mod.rs - Session endpoints for authenticated callers

pub mod whoami; // GET /api/auth/me

pub use whoami::whoami_get;
