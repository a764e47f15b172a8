// handlers/mod.rs - Handlers grouped by the guard in front of them
//
// Public (no token) → Protected (any valid token) → Elevated (role allow-set)
//
// Ticket deletion lives with the other ticket handlers in `protected` but is
// wrapped in the admin guard at the route, same as comment deletion with the
// staff guard.

pub mod elevated; // Admin: /api/users/*
pub mod protected; // Authenticated: /api/auth/me, /api/tickets/*, /api/comments/*
pub mod public; // Anonymous: /api/auth/register, /api/auth/login
