// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Security Level: None
// Routes: /api/auth/register, /api/auth/login

pub mod auth;

pub use auth::{login_post, register_post, TokenResponse};
