//! Integration tests for the address endpoints.
//!
//! Require a running backend and its database. Run with:
//! `cargo test -p okome-integration-tests -- --ignored`

use okome_integration_tests::{base_url, register_and_login, session_client};
use serde_json::{Value, json};

fn address_body(recipient: &str) -> Value {
    json!({
        "recipient_name": recipient,
        "postal_code": "150-0001",
        "address_1": "Tokyo, Shibuya 1-2-3",
        "phone": "03-1234-5678",
    })
}

#[tokio::test]
#[ignore = "requires a running backend and database"]
async fn test_set_default_keeps_a_single_default() {
    let client = session_client();
    let base = base_url();
    register_and_login(&client, "addr").await;

    let first: Value = client
        .post(format!("{base}/api/addresses"))
        .json(&address_body("First"))
        .send()
        .await
        .expect("create first address")
        .json()
        .await
        .expect("first address json");
    let second: Value = client
        .post(format!("{base}/api/addresses"))
        .json(&address_body("Second"))
        .send()
        .await
        .expect("create second address")
        .json()
        .await
        .expect("second address json");

    // Flip the default twice; only the last winner may keep the flag.
    for address in [&first, &second] {
        let resp = client
            .put(format!("{base}/api/addresses/{}/default", address["id"]))
            .send()
            .await
            .expect("set default");
        assert!(resp.status().is_success());
    }

    let list: Vec<Value> = client
        .get(format!("{base}/api/addresses"))
        .send()
        .await
        .expect("list addresses")
        .json()
        .await
        .expect("list json");

    let defaults: Vec<&Value> = list
        .iter()
        .filter(|a| a["is_default"] == json!(true))
        .collect();
    assert_eq!(defaults.len(), 1, "exactly one default address");
    assert_eq!(defaults[0]["id"], second["id"]);
}

#[tokio::test]
#[ignore = "requires a running backend and database"]
async fn test_set_default_rejects_foreign_address() {
    let owner = session_client();
    let base = base_url();
    register_and_login(&owner, "owner").await;

    let address: Value = owner
        .post(format!("{base}/api/addresses"))
        .json(&address_body("Owner"))
        .send()
        .await
        .expect("create address")
        .json()
        .await
        .expect("address json");

    let intruder = session_client();
    register_and_login(&intruder, "intruder").await;

    let resp = intruder
        .put(format!("{base}/api/addresses/{}/default", address["id"]))
        .send()
        .await
        .expect("set default attempt");
    assert_eq!(resp.status(), 404);
}
