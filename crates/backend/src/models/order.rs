//! Order and order item models.

use chrono::{DateTime, Utc};
use serde::Serialize;

use okome_core::{AddressId, FulfillStatus, OrderId, OrderItemId, OrderStatus, UserId};

/// A persisted order, keyed externally by `shopify_order_id`.
///
/// `user_id` is NULL for guest orders; the shipping_* columns are a snapshot
/// captured at order time and used when no `address_id` is linked.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Order {
    pub id: OrderId,
    pub shopify_order_id: String,
    pub order_number: Option<i64>,
    pub user_id: Option<UserId>,
    pub email: Option<String>,
    pub currency: String,
    pub total_price: i64,
    pub status: OrderStatus,
    pub fulfill_status: FulfillStatus,
    pub ordered_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub fulfilled_at: Option<DateTime<Utc>>,
    pub address_id: Option<AddressId>,
    #[serde(skip_serializing)]
    pub shipping_name: Option<String>,
    #[serde(skip_serializing)]
    pub shipping_phone: Option<String>,
    #[serde(skip_serializing)]
    pub shipping_postal_code: Option<String>,
    #[serde(skip_serializing)]
    pub shipping_address_1: Option<String>,
    #[serde(skip_serializing)]
    pub shipping_address_2: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// The shipping snapshot, if any shipping field was captured.
    #[must_use]
    pub fn shipping_snapshot(&self) -> Option<ShippingSnapshot> {
        if self.shipping_name.is_none()
            && self.shipping_postal_code.is_none()
            && self.shipping_address_1.is_none()
        {
            return None;
        }

        Some(ShippingSnapshot {
            name: self.shipping_name.clone(),
            phone: self.shipping_phone.clone(),
            postal_code: self.shipping_postal_code.clone(),
            address_1: self.shipping_address_1.clone(),
            address_2: self.shipping_address_2.clone(),
        })
    }
}

/// Shipping address fields copied onto an order at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShippingSnapshot {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub postal_code: Option<String>,
    pub address_1: Option<String>,
    pub address_2: Option<String>,
}

/// A line item belonging to exactly one order.
///
/// Items are fully owned by their order: reconciliation replaces the whole
/// set, never diffs it.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderItem {
    pub id: OrderItemId,
    #[serde(skip_serializing)]
    pub order_id: OrderId,
    pub product_id: String,
    pub title: String,
    pub quantity: i32,
    pub price: i64,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}
