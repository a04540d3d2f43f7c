//! Integration tests for the okome-site backend.
//!
//! These tests exercise a running backend over HTTP together with its
//! database, so they are `#[ignore]`d by default. To run them:
//!
//! ```bash
//! # Start PostgreSQL and the backend
//! cargo run -p okome-backend &
//!
//! # Run the suite
//! cargo test -p okome-integration-tests -- --ignored
//! ```
//!
//! Environment:
//!
//! - `BACKEND_BASE_URL` — backend under test (default `http://localhost:4000`)
//! - `DATABASE_URL` — the backend's database, for direct assertions
//! - `SHOPIFY_WEBHOOK_SECRET` — must match the backend's, for signing

use base64::Engine;
use hmac::{Hmac, Mac};
use reqwest::Client;
use sha2::Sha256;
use sqlx::PgPool;

/// Base URL of the backend under test.
#[must_use]
pub fn base_url() -> String {
    std::env::var("BACKEND_BASE_URL").unwrap_or_else(|_| "http://localhost:4000".to_string())
}

/// Connect to the backend's database for direct assertions.
///
/// # Panics
///
/// Panics when `DATABASE_URL` is unset or unreachable.
pub async fn pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    PgPool::connect(&url)
        .await
        .expect("Failed to connect to test database")
}

/// HTTP client with a cookie store, so a login session carries across
/// requests.
///
/// # Panics
///
/// Panics when the client cannot be built.
#[must_use]
pub fn session_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// Sign a webhook body the way Shopify does: base64 HMAC-SHA256 with the
/// shared secret.
///
/// # Panics
///
/// Panics when `SHOPIFY_WEBHOOK_SECRET` is unset.
#[must_use]
pub fn sign_webhook(body: &[u8]) -> String {
    let secret = std::env::var("SHOPIFY_WEBHOOK_SECRET").expect("SHOPIFY_WEBHOOK_SECRET must be set");
    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(body);
    base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes())
}

/// A unique suffix for emails and order ids, so reruns never collide.
#[must_use]
pub fn unique_suffix() -> String {
    chrono::Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_default()
        .to_string()
}

/// Deliver a signed webhook to the backend.
///
/// # Panics
///
/// Panics when the request cannot be sent.
pub async fn post_webhook(client: &Client, topic: &str, body: &serde_json::Value) -> reqwest::Response {
    let raw = serde_json::to_vec(body).expect("body serializes");
    let signature = sign_webhook(&raw);

    client
        .post(format!("{}/api/webhook/shopify", base_url()))
        .header("X-Shopify-Topic", topic)
        .header("X-Shopify-Hmac-Sha256", signature)
        .header("Content-Type", "application/json")
        .body(raw)
        .send()
        .await
        .expect("Failed to deliver webhook")
}

/// Register a fresh account and leave its session in the client's cookie
/// store. Returns the email.
///
/// # Panics
///
/// Panics when registration does not succeed.
pub async fn register_and_login(client: &Client, prefix: &str) -> String {
    let email = format!("{prefix}-{}@example.com", unique_suffix());
    let resp = client
        .post(format!("{}/api/auth/register", base_url()))
        .json(&serde_json::json!({
            "email": email,
            "password": "correct horse battery",
        }))
        .send()
        .await
        .expect("Failed to register");

    assert!(
        resp.status().is_success(),
        "registration failed with {}",
        resp.status()
    );
    email
}
