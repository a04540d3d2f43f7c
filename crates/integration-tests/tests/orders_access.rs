//! Integration tests for order detail access control.
//!
//! Require a running backend, its database, and a matching
//! `SHOPIFY_WEBHOOK_SECRET`. Run with:
//! `cargo test -p okome-integration-tests -- --ignored`

use okome_integration_tests::{base_url, pool, post_webhook, register_and_login, session_client, unique_suffix};
use serde_json::json;

#[tokio::test]
#[ignore = "requires a running backend and database"]
async fn test_order_detail_distinguishes_forbidden_from_not_found() {
    let client = session_client();
    let base = base_url();
    let pool = pool().await;
    let suffix = unique_suffix();
    let order_id = format!("acc-{suffix}");

    // Seed a guest order belonging to someone else's email.
    let payload = json!({
        "id": order_id,
        "email": format!("stranger-{suffix}@example.com"),
        "total_price": "1500",
        "line_items": [
            {"id": 1, "product_id": 11, "title": "Koshihikari 5kg", "quantity": 1, "price": "1500"}
        ],
    });
    assert_eq!(post_webhook(&client, "orders/create", &payload).await.status(), 200);

    let local_id: i32 = sqlx::query_scalar("SELECT id FROM orders WHERE shopify_order_id = $1")
        .bind(&order_id)
        .fetch_one(&pool)
        .await
        .expect("seeded order exists");

    register_and_login(&client, "viewer").await;

    // Existing but not ours: forbidden, not hidden.
    let resp = client
        .get(format!("{base}/api/orders/{local_id}"))
        .send()
        .await
        .expect("order detail request");
    assert_eq!(resp.status(), 403);
    let body: serde_json::Value = resp.json().await.expect("error body");
    assert_eq!(body["code"], "FORBIDDEN");

    // Nonexistent id: not found.
    let resp = client
        .get(format!("{base}/api/orders/{}", i32::MAX))
        .send()
        .await
        .expect("missing order request");
    assert_eq!(resp.status(), 404);
    let body: serde_json::Value = resp.json().await.expect("error body");
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
#[ignore = "requires a running backend and database"]
async fn test_guest_order_surfaces_after_registration() {
    let client = session_client();
    let base = base_url();
    let suffix = unique_suffix();
    let email = format!("late-{suffix}@example.com");
    let order_id = format!("guest-{suffix}");

    let payload = json!({
        "id": order_id,
        "email": email,
        "total_price": "1500",
        "line_items": [
            {"id": 1, "product_id": 11, "title": "Koshihikari 5kg", "quantity": 1, "price": "1500"}
        ],
    });
    assert_eq!(post_webhook(&client, "orders/create", &payload).await.status(), 200);

    // Register with the same email afterwards; the order list must pick
    // the guest order up by email match.
    let resp = client
        .post(format!("{base}/api/auth/register"))
        .json(&json!({"email": email, "password": "correct horse battery"}))
        .send()
        .await
        .expect("register");
    assert!(resp.status().is_success());

    let orders: Vec<serde_json::Value> = client
        .get(format!("{base}/api/orders"))
        .send()
        .await
        .expect("order list")
        .json()
        .await
        .expect("order list json");

    assert!(
        orders.iter().any(|o| o["shopify_order_id"] == json!(order_id)),
        "guest order visible after registration"
    );
}
