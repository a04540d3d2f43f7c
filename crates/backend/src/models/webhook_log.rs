//! Webhook audit log model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use okome_core::WebhookLogId;

/// One inbound webhook delivery attempt.
///
/// Rows are written before signature verification gates anything and are
/// never updated or deleted, so forged or malformed deliveries stay visible.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct WebhookLog {
    pub id: WebhookLogId,
    pub topic: String,
    pub payload: serde_json::Value,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}
