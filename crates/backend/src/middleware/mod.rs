//! HTTP middleware stack for the backend.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Session layer (tower-sessions with `PostgreSQL` store)
//! 4. Rate limiting (governor, webhook and auth mounts only)

pub mod auth;
pub mod rate_limit;
pub mod session;

pub use auth::{OptionalUser, RequireUser, clear_current_user, set_current_user};
pub use rate_limit::{auth_rate_limiter, webhook_rate_limiter};
pub use session::create_session_layer;
