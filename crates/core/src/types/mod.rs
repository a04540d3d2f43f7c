//! Shared domain types.

pub mod amount;
pub mod email;
pub mod id;
pub mod status;

pub use amount::{AmountError, parse_amount};
pub use email::{Email, EmailError};
pub use id::{AddressId, OrderId, OrderItemId, UserId, WebhookLogId};
pub use status::{FulfillStatus, OrderStatus};
