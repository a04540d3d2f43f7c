//! Integration test for checkout with a pre-filled shipping address.
//!
//! Requires a running backend, its database, and real Shopify Storefront
//! credentials plus a purchasable variant id in `SHOPIFY_TEST_VARIANT_ID`.
//! Run with: `cargo test -p okome-integration-tests -- --ignored`

use okome_integration_tests::{base_url, register_and_login, session_client};
use serde_json::{Value, json};

#[tokio::test]
#[ignore = "requires a running backend, database, and Shopify credentials"]
async fn test_checkout_uses_default_address_when_none_requested() {
    let variant_id =
        std::env::var("SHOPIFY_TEST_VARIANT_ID").expect("SHOPIFY_TEST_VARIANT_ID must be set");

    let client = session_client();
    let base = base_url();
    register_and_login(&client, "checkout").await;

    let address: Value = client
        .post(format!("{base}/api/addresses"))
        .json(&json!({
            "recipient_name": "Yamada Taro",
            "postal_code": "150-0001",
            "address_1": "Tokyo, Shibuya 1-2-3",
            "phone": "03-1234-5678",
        }))
        .send()
        .await
        .expect("create address")
        .json()
        .await
        .expect("address json");

    let resp = client
        .put(format!("{base}/api/addresses/{}/default", address["id"]))
        .send()
        .await
        .expect("set default");
    assert!(resp.status().is_success());

    // No address_id in the body: the default must be resolved and the
    // checkout still created.
    let resp = client
        .post(format!("{base}/api/checkout"))
        .json(&json!({
            "lines": [{"variantId": variant_id, "quantity": 1}],
        }))
        .send()
        .await
        .expect("checkout request");
    assert_eq!(resp.status(), 200);

    let checkout: Value = resp.json().await.expect("checkout json");
    assert!(
        checkout["webUrl"].as_str().is_some_and(|u| u.starts_with("https://")),
        "hosted payment URL present"
    );
}
