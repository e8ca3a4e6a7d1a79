//! Middleware del sistema
//!
//! Autenticación del administrador, CORS y rate limiting del login.

pub mod auth;
pub mod cors;
pub mod rate_limit;

pub use auth::require_admin;
pub use cors::cors_layer;
pub use rate_limit::{login_rate_limit, RateLimitState};
