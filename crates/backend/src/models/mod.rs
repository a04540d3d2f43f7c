//! Domain models for the backend.

pub mod address;
pub mod order;
pub mod user;
pub mod webhook_log;

pub use address::Address;
pub use order::{Order, OrderItem, ShippingSnapshot};
pub use user::{CurrentUser, User};
pub use webhook_log::WebhookLog;

/// Session keys used by the auth middleware.
pub mod session_keys {
    /// Key under which the logged-in user is stored in the session.
    pub const CURRENT_USER: &str = "current_user";
}
