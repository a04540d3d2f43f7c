//! Shipping address model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use okome_core::{AddressId, UserId};

/// A user's shipping address.
///
/// At most one address per user has `is_default = true`; the repository's
/// `set_default` enforces this transactionally.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Address {
    pub id: AddressId,
    #[serde(skip_serializing)]
    pub user_id: UserId,
    pub recipient_name: String,
    pub postal_code: String,
    pub address_1: String,
    pub address_2: Option<String>,
    pub phone: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
