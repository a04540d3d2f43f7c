//! Append-only audit trail for incoming webhooks.
//!
//! Every delivery is recorded before any gating decision, so the log also
//! captures rejected and unverifiable deliveries.

use sqlx::PgPool;

use super::RepositoryError;
use crate::models::WebhookLog;

const LOG_COLUMNS: &str = "id, topic, payload, verified, created_at";

/// Repository for the webhook audit log.
pub struct WebhookLogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> WebhookLogRepository<'a> {
    /// Create a new webhook log repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Append one delivery to the log.
    ///
    /// `payload` is the parsed body, or an error marker object when the body
    /// was not valid JSON. Rows are never updated or deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(
        &self,
        topic: &str,
        payload: &serde_json::Value,
        verified: bool,
    ) -> Result<WebhookLog, RepositoryError> {
        let log = sqlx::query_as::<_, WebhookLog>(&format!(
            "INSERT INTO webhook_logs (topic, payload, verified)
             VALUES ($1, $2, $3)
             RETURNING {LOG_COLUMNS}"
        ))
        .bind(topic)
        .bind(payload)
        .bind(verified)
        .fetch_one(self.pool)
        .await?;

        Ok(log)
    }
}
