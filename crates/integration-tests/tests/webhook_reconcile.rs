//! Integration tests for webhook-driven order reconciliation.
//!
//! These require a running backend, its database, and a
//! `SHOPIFY_WEBHOOK_SECRET` matching the backend's. Run with:
//! `cargo test -p okome-integration-tests -- --ignored`

use okome_integration_tests::{pool, post_webhook, session_client, unique_suffix};
use serde_json::{Value, json};

fn order_payload(shopify_order_id: &str, total: &str, line_items: Value) -> Value {
    json!({
        "id": shopify_order_id,
        "order_number": 1001,
        "email": "guest@example.com",
        "currency": "JPY",
        "total_price": total,
        "financial_status": "pending",
        "created_at": "2026-01-01T00:00:00Z",
        "line_items": line_items,
    })
}

#[tokio::test]
#[ignore = "requires a running backend and database"]
async fn test_reconcile_twice_is_idempotent_and_replaces_items() {
    let client = session_client();
    let pool = pool().await;
    let order_id = format!("it-{}", unique_suffix());

    let first = order_payload(
        &order_id,
        "3000",
        json!([
            {"id": 1, "product_id": 11, "title": "Koshihikari 5kg", "quantity": 1, "price": "1500"},
            {"id": 2, "product_id": 12, "title": "Akitakomachi 2kg", "quantity": 1, "price": "1500"}
        ]),
    );
    let resp = post_webhook(&client, "orders/create", &first).await;
    assert_eq!(resp.status(), 200);

    // A later delivery replaces the item set wholesale.
    let second = order_payload(
        &order_id,
        "4500",
        json!([
            {"id": 3, "product_id": 11, "title": "Koshihikari 5kg", "quantity": 3, "price": "1500"}
        ]),
    );
    let resp = post_webhook(&client, "orders/updated", &second).await;
    assert_eq!(resp.status(), 200);

    let (rows, total): (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COALESCE(MAX(total_price), 0) FROM orders WHERE shopify_order_id = $1",
    )
    .bind(&order_id)
    .fetch_one(&pool)
    .await
    .expect("orders query");

    assert_eq!(rows, 1, "reconcile must never duplicate an order");
    assert_eq!(total, 4500);

    let items: Vec<(String, i32)> = sqlx::query_as(
        "SELECT oi.product_id, oi.quantity FROM order_items oi
         JOIN orders o ON o.id = oi.order_id
         WHERE o.shopify_order_id = $1
         ORDER BY oi.id",
    )
    .bind(&order_id)
    .fetch_all(&pool)
    .await
    .expect("items query");

    assert_eq!(items, vec![("11".to_owned(), 3)]);
}

#[tokio::test]
#[ignore = "requires a running backend and database"]
async fn test_paid_event_for_unknown_order_is_logged_and_acknowledged() {
    let client = session_client();
    let pool = pool().await;
    let order_id = format!("missing-{}", unique_suffix());

    let resp = post_webhook(
        &client,
        "orders/paid",
        &json!({"id": order_id, "financial_status": "paid"}),
    )
    .await;
    assert_eq!(resp.status(), 200, "out-of-order events must still succeed");

    let anomalies: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM webhook_logs
         WHERE payload->>'anomaly' = 'order_not_found'
           AND payload->>'shopify_order_id' = $1",
    )
    .bind(&order_id)
    .fetch_one(&pool)
    .await
    .expect("webhook_logs query");
    assert_eq!(anomalies, 1);

    let orders: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE shopify_order_id = $1")
            .bind(&order_id)
            .fetch_one(&pool)
            .await
            .expect("orders query");
    assert_eq!(orders, 0, "a lone paid event must not fabricate an order");
}

#[tokio::test]
#[ignore = "requires a running backend and database"]
async fn test_replayed_create_never_downgrades_paid_status() {
    let client = session_client();
    let pool = pool().await;
    let order_id = format!("replay-{}", unique_suffix());

    let create = order_payload(
        &order_id,
        "1500",
        json!([{"id": 1, "product_id": 11, "title": "Koshihikari 5kg", "quantity": 1, "price": "1500"}]),
    );
    assert_eq!(post_webhook(&client, "orders/create", &create).await.status(), 200);

    let paid = json!({"id": order_id, "financial_status": "paid"});
    assert_eq!(post_webhook(&client, "orders/paid", &paid).await.status(), 200);

    // The replay still says pending; the stored status must not move back.
    assert_eq!(post_webhook(&client, "orders/updated", &create).await.status(), 200);

    let status: String = sqlx::query_scalar("SELECT status FROM orders WHERE shopify_order_id = $1")
        .bind(&order_id)
        .fetch_one(&pool)
        .await
        .expect("status query");
    assert_eq!(status, "paid");
}
