//! Shopify webhook ingestion.
//!
//! The handler consumes the raw body bytes (signature verification must run
//! on the exact bytes on the wire), then:
//!
//! 1. verifies the `X-Shopify-Hmac-Sha256` header against the raw body;
//! 2. parses the body as JSON, substituting an error marker when it isn't;
//! 3. appends a `webhook_logs` row with the verification result — before
//!    any gating, so rejected deliveries are audited too;
//! 4. rejects with `400` when the topic header is missing and `401` when
//!    the signature did not verify;
//! 5. dispatches by topic and answers `200` with `{"ok": true}`.
//!
//! Unknown topics are logged and acknowledged, so new upstream event types
//! never cause retry storms.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use tracing::{info, warn};

use crate::db::webhook_logs::WebhookLogRepository;
use crate::error::{AppError, Result};
use crate::services::OrderReconciler;
use crate::shopify::OrderPayload;
use crate::state::AppState;

/// Topic header sent with every Shopify webhook.
const TOPIC_HEADER: &str = "x-shopify-topic";
/// Signature header: base64 HMAC-SHA256 of the raw body.
const HMAC_HEADER: &str = "x-shopify-hmac-sha256";

/// `POST /api/webhook/shopify`
///
/// # Errors
///
/// `400` without a topic or signature header or an unparseable body, `401`
/// on signature failure, `500` when the audit log or reconciliation cannot
/// be persisted.
pub async fn shopify(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<serde_json::Value>)> {
    let topic = headers
        .get(TOPIC_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let signature = headers.get(HMAC_HEADER).and_then(|v| v.to_str().ok());
    let verified = state.verifier().verify(&body, signature);

    let parsed: std::result::Result<serde_json::Value, serde_json::Error> =
        serde_json::from_slice(&body);
    let payload = match &parsed {
        Ok(value) => value.clone(),
        Err(e) => serde_json::json!({
            "parse_error": e.to_string(),
            "raw": String::from_utf8_lossy(&body),
        }),
    };

    // Audit first: the log row must exist even for deliveries we reject.
    WebhookLogRepository::new(state.pool())
        .insert(topic.as_deref().unwrap_or("unknown"), &payload, verified)
        .await?;

    let Some(topic) = topic else {
        return Err(AppError::Validation("missing topic header".to_owned()));
    };
    if signature.is_none() {
        return Err(AppError::Validation("missing signature header".to_owned()));
    }

    if !verified {
        warn!(topic, "webhook signature verification failed");
        return Err(AppError::Unauthorized("invalid signature".to_owned()));
    }

    // Verified but unparseable: audited above, rejected here.
    if let Err(e) = parsed {
        return Err(AppError::Validation(format!("body is not valid JSON: {e}")));
    }

    dispatch(&state, &topic, &payload).await?;

    Ok((StatusCode::OK, Json(serde_json::json!({ "ok": true }))))
}

async fn dispatch(state: &AppState, topic: &str, payload: &serde_json::Value) -> Result<()> {
    let reconciler = OrderReconciler::new(state.pool());

    match topic {
        "orders/create" | "orders/updated" => {
            let order: OrderPayload = serde_json::from_value(payload.clone())
                .map_err(|e| AppError::Validation(format!("malformed order payload: {e}")))?;
            reconciler.apply_create_or_update(&order).await?;
        }
        "orders/paid" => {
            let id = order_id_of(payload)?;
            reconciler.apply_paid(&id).await?;
        }
        "orders/cancelled" => {
            let order: OrderPayload = serde_json::from_value(payload.clone())
                .map_err(|e| AppError::Validation(format!("malformed order payload: {e}")))?;
            let id = order_id_of(payload)?;
            reconciler.apply_cancelled(&id, order.cancelled_at).await?;
        }
        "orders/fulfilled" => {
            let order: OrderPayload = serde_json::from_value(payload.clone())
                .map_err(|e| AppError::Validation(format!("malformed order payload: {e}")))?;
            let id = order_id_of(payload)?;
            reconciler.apply_fulfilled(&id, order.fulfilled_at()).await?;
        }
        other => {
            info!(topic = other, "ignoring unhandled webhook topic");
        }
    }

    Ok(())
}

/// Extract the order id as a string, whether it arrived as number or
/// string.
fn order_id_of(payload: &serde_json::Value) -> Result<String> {
    match payload.get("id") {
        Some(serde_json::Value::Number(n)) => Ok(n.to_string()),
        Some(serde_json::Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        _ => Err(AppError::Validation("payload is missing order id".to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_id_of_numeric_and_string() {
        assert_eq!(
            order_id_of(&serde_json::json!({"id": 555})).expect("id"),
            "555"
        );
        assert_eq!(
            order_id_of(&serde_json::json!({"id": "555"})).expect("id"),
            "555"
        );
    }

    #[test]
    fn test_order_id_of_missing() {
        assert!(order_id_of(&serde_json::json!({})).is_err());
        assert!(order_id_of(&serde_json::json!({"id": ""})).is_err());
    }
}
