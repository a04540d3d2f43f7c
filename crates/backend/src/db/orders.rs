//! Order repository: transactional webhook upsert, lifecycle updates, and
//! the read side used by the order endpoints.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use okome_core::{FulfillStatus, OrderId, OrderStatus, UserId};

use super::RepositoryError;
use crate::models::{Order, OrderItem, ShippingSnapshot};

const ORDER_COLUMNS: &str = "id, shopify_order_id, order_number, user_id, email, currency, \
                             total_price, status, fulfill_status, ordered_at, cancelled_at, \
                             fulfilled_at, address_id, shipping_name, shipping_phone, \
                             shipping_postal_code, shipping_address_1, shipping_address_2, \
                             created_at, updated_at";

const ITEM_COLUMNS: &str = "id, order_id, product_id, title, quantity, price, image_url, created_at";

/// Order fields derived from a webhook payload, ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub shopify_order_id: String,
    pub order_number: Option<i64>,
    pub email: Option<String>,
    pub currency: String,
    pub total_price: i64,
    pub status: OrderStatus,
    pub fulfill_status: FulfillStatus,
    pub ordered_at: Option<DateTime<Utc>>,
    pub shipping: Option<ShippingSnapshot>,
}

/// Line item fields derived from a webhook payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
    pub product_id: String,
    pub title: String,
    pub quantity: i32,
    pub price: i64,
    pub image_url: Option<String>,
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Idempotent upsert of an order and its full item set, keyed by
    /// `shopify_order_id`.
    ///
    /// Runs as one transaction:
    ///
    /// 1. insert a pending skeleton row if the order is new (`ON CONFLICT DO
    ///    NOTHING`), then lock the row with `FOR UPDATE` so concurrent
    ///    deliveries for the same order serialize here;
    /// 2. overwrite the derived fields; `status` and `fulfill_status` only
    ///    move forward (monotonic policy) so a replayed create payload can
    ///    never downgrade an already-paid or cancelled order;
    /// 3. delete every existing item and insert the new set.
    ///
    /// Delivering the same payload twice therefore leaves the order and its
    /// items identical to a single delivery.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails; the
    /// transaction rolls back and no partial state is persisted.
    pub async fn reconcile(
        &self,
        new_order: &NewOrder,
        items: &[NewOrderItem],
        user_id: Option<UserId>,
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO orders (shopify_order_id, total_price)
             VALUES ($1, $2)
             ON CONFLICT (shopify_order_id) DO NOTHING",
        )
        .bind(&new_order.shopify_order_id)
        .bind(new_order.total_price)
        .execute(&mut *tx)
        .await?;

        let current = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE shopify_order_id = $1 FOR UPDATE"
        ))
        .bind(&new_order.shopify_order_id)
        .fetch_one(&mut *tx)
        .await?;

        let status = if current.status.can_advance_to(new_order.status) {
            new_order.status
        } else {
            current.status
        };
        let fulfill_status = if current.fulfill_status.can_advance_to(new_order.fulfill_status) {
            new_order.fulfill_status
        } else {
            current.fulfill_status
        };

        let shipping = new_order.shipping.clone().unwrap_or(ShippingSnapshot {
            name: None,
            phone: None,
            postal_code: None,
            address_1: None,
            address_2: None,
        });

        let order = sqlx::query_as::<_, Order>(&format!(
            "UPDATE orders
             SET order_number = $2, user_id = $3, email = $4, currency = $5,
                 total_price = $6, status = $7, fulfill_status = $8, ordered_at = $9,
                 shipping_name = $10, shipping_phone = $11, shipping_postal_code = $12,
                 shipping_address_1 = $13, shipping_address_2 = $14, updated_at = NOW()
             WHERE id = $1
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(current.id)
        .bind(new_order.order_number)
        .bind(user_id)
        .bind(&new_order.email)
        .bind(&new_order.currency)
        .bind(new_order.total_price)
        .bind(status)
        .bind(fulfill_status)
        .bind(new_order.ordered_at)
        .bind(&shipping.name)
        .bind(&shipping.phone)
        .bind(&shipping.postal_code)
        .bind(&shipping.address_1)
        .bind(&shipping.address_2)
        .fetch_one(&mut *tx)
        .await?;

        // Full replacement; items are wholly owned by the order.
        sqlx::query("DELETE FROM order_items WHERE order_id = $1")
            .bind(order.id)
            .execute(&mut *tx)
            .await?;

        for item in items {
            sqlx::query(
                "INSERT INTO order_items (order_id, product_id, title, quantity, price, image_url)
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(order.id)
            .bind(&item.product_id)
            .bind(&item.title)
            .bind(item.quantity)
            .bind(item.price)
            .bind(&item.image_url)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(order)
    }

    /// Mark an order paid. Cancelled orders stay cancelled.
    ///
    /// Returns `None` if no order with this `shopify_order_id` exists
    /// (out-of-order delivery); the caller audit-logs that case.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn mark_paid(&self, shopify_order_id: &str) -> Result<Option<Order>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "UPDATE orders
             SET status = CASE WHEN status = 'cancelled' THEN status ELSE 'paid' END,
                 updated_at = NOW()
             WHERE shopify_order_id = $1
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(shopify_order_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(order)
    }

    /// Mark an order cancelled, stamping `cancelled_at` (now if upstream
    /// omitted it). Returns `None` if the order doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn mark_cancelled(
        &self,
        shopify_order_id: &str,
        cancelled_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Order>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "UPDATE orders
             SET status = 'cancelled', cancelled_at = COALESCE($2, NOW()), updated_at = NOW()
             WHERE shopify_order_id = $1
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(shopify_order_id)
        .bind(cancelled_at)
        .fetch_optional(self.pool)
        .await?;

        Ok(order)
    }

    /// Mark an order fulfilled, stamping `fulfilled_at` (now if upstream
    /// omitted it). Returns `None` if the order doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn mark_fulfilled(
        &self,
        shopify_order_id: &str,
        fulfilled_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Order>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "UPDATE orders
             SET fulfill_status = 'fulfilled', fulfilled_at = COALESCE($2, NOW()),
                 updated_at = NOW()
             WHERE shopify_order_id = $1
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(shopify_order_id)
        .bind(fulfilled_at)
        .fetch_optional(self.pool)
        .await?;

        Ok(order)
    }

    /// List the orders visible to a principal: their own, plus guest orders
    /// placed under the same email before they registered.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for(
        &self,
        user_id: UserId,
        email: &str,
    ) -> Result<Vec<Order>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders
             WHERE user_id = $1 OR (user_id IS NULL AND email = $2)
             ORDER BY ordered_at DESC NULLS LAST, id DESC"
        ))
        .bind(user_id)
        .bind(email)
        .fetch_all(self.pool)
        .await?;

        Ok(orders)
    }

    /// Fetch an order by its local id, regardless of owner. Authorization is
    /// the route layer's job (forbidden, not not-found, for foreign orders).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(order)
    }

    /// Fetch the items of one order, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items_for(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        let items = sqlx::query_as::<_, OrderItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = $1 ORDER BY id"
        ))
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;

        Ok(items)
    }

    /// Fetch the items of several orders at once (for list responses).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items_for_orders(
        &self,
        order_ids: &[OrderId],
    ) -> Result<Vec<OrderItem>, RepositoryError> {
        let ids: Vec<i32> = order_ids.iter().map(|id| id.as_i32()).collect();

        let items = sqlx::query_as::<_, OrderItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = ANY($1) ORDER BY order_id, id"
        ))
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        Ok(items)
    }
}
