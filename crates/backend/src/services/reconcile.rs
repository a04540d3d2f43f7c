//! Order reconciliation service.
//!
//! Applies verified webhook events to local order state. Create/update
//! events upsert the order and replace its items; lifecycle events (paid,
//! cancelled, fulfilled) advance status. Events arriving before the order
//! exists are recorded in the audit log and otherwise ignored, so upstream
//! retries always get a success response.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{info, warn};

use okome_core::UserId;

use crate::db::RepositoryError;
use crate::db::orders::OrderRepository;
use crate::db::users::UserRepository;
use crate::db::webhook_logs::WebhookLogRepository;
use crate::models::Order;
use crate::shopify::payload::{OrderPayload, PayloadError};

/// Errors from reconciliation.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// The payload could not be derived into an order.
    #[error(transparent)]
    Payload(#[from] PayloadError),

    /// Repository/database error.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// The outcome of applying one lifecycle event.
#[derive(Debug)]
pub enum ReconcileOutcome {
    /// The event was applied to an existing order.
    Applied(Order),
    /// The order was not found; the anomaly was audit-logged and the event
    /// dropped.
    OrderMissing,
}

/// Applies webhook order events to the local database.
pub struct OrderReconciler<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderReconciler<'a> {
    /// Create a new reconciler.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Apply an `orders/create` or `orders/updated` payload.
    ///
    /// Derives the order fields, links the order to a registered user when
    /// the payload email matches one (otherwise it stays a guest order),
    /// then upserts order and items in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError::Payload` when required fields are missing or
    /// unparseable, `ReconcileError::Repository` on database failure.
    pub async fn apply_create_or_update(
        &self,
        payload: &OrderPayload,
    ) -> Result<Order, ReconcileError> {
        let (new_order, items) = payload.derive()?;

        let user_id = match new_order.email.as_deref() {
            Some(email) => self.find_user(email).await?,
            None => None,
        };

        let order = OrderRepository::new(self.pool)
            .reconcile(&new_order, &items, user_id)
            .await?;

        info!(
            shopify_order_id = %order.shopify_order_id,
            status = %order.status,
            items = items.len(),
            linked = user_id.is_some(),
            "order reconciled"
        );

        Ok(order)
    }

    /// Apply an `orders/paid` event.
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError::Repository` on database failure.
    pub async fn apply_paid(
        &self,
        shopify_order_id: &str,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let order = OrderRepository::new(self.pool)
            .mark_paid(shopify_order_id)
            .await?;

        self.resolve_outcome("orders/paid", shopify_order_id, order)
            .await
    }

    /// Apply an `orders/cancelled` event.
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError::Repository` on database failure.
    pub async fn apply_cancelled(
        &self,
        shopify_order_id: &str,
        cancelled_at: Option<DateTime<Utc>>,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let order = OrderRepository::new(self.pool)
            .mark_cancelled(shopify_order_id, cancelled_at)
            .await?;

        self.resolve_outcome("orders/cancelled", shopify_order_id, order)
            .await
    }

    /// Apply an `orders/fulfilled` event.
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError::Repository` on database failure.
    pub async fn apply_fulfilled(
        &self,
        shopify_order_id: &str,
        fulfilled_at: Option<DateTime<Utc>>,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let order = OrderRepository::new(self.pool)
            .mark_fulfilled(shopify_order_id, fulfilled_at)
            .await?;

        self.resolve_outcome("orders/fulfilled", shopify_order_id, order)
            .await
    }

    async fn find_user(&self, email: &str) -> Result<Option<UserId>, ReconcileError> {
        Ok(UserRepository::new(self.pool)
            .find_id_by_email(email)
            .await?)
    }

    /// Audit-log an out-of-order delivery and map the update result to an
    /// outcome. Dropping the event (instead of fabricating an order) keeps
    /// a lone paid/cancelled event from creating a row with no items.
    async fn resolve_outcome(
        &self,
        topic: &str,
        shopify_order_id: &str,
        order: Option<Order>,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        match order {
            Some(order) => Ok(ReconcileOutcome::Applied(order)),
            None => {
                warn!(topic, shopify_order_id, "event for unknown order, skipping");

                WebhookLogRepository::new(self.pool)
                    .insert(
                        topic,
                        &serde_json::json!({
                            "anomaly": "order_not_found",
                            "shopify_order_id": shopify_order_id,
                        }),
                        true,
                    )
                    .await?;

                Ok(ReconcileOutcome::OrderMissing)
            }
        }
    }
}
