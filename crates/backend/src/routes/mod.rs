//! HTTP route handlers for the backend API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                       - Liveness check
//! GET  /health/ready                 - Readiness check (pings the database)
//!
//! # Auth (rate limited)
//! POST /api/auth/register            - Create account, start session
//! POST /api/auth/login               - Login, start session
//! POST /api/auth/logout              - End session
//! GET  /api/auth/me                  - Current user
//!
//! # Addresses (requires auth)
//! GET    /api/addresses              - List own addresses
//! POST   /api/addresses              - Create address
//! PUT    /api/addresses/{id}         - Update address
//! DELETE /api/addresses/{id}         - Delete address
//! PUT    /api/addresses/{id}/default - Make the single default
//!
//! # Orders (requires auth, read-only)
//! GET  /api/orders                   - Own + guest-by-email orders
//! GET  /api/orders/{id}              - Order detail
//!
//! # Products (Shopify proxy, public)
//! GET  /api/products                 - Catalog listing
//! GET  /api/products/{handle}        - Product detail
//!
//! # Cart (Shopify proxy, requires auth)
//! POST /api/cart                     - Create cart
//! GET  /api/cart/{id}                - Fetch cart
//! POST /api/cart/{id}/add            - Add lines
//! POST /api/cart/{id}/update         - Update one line's quantity
//! POST /api/cart/{id}/remove         - Remove lines
//!
//! # Checkout
//! POST /api/checkout                 - Create a Shopify checkout
//!
//! # Webhooks (raw body, rate limited)
//! POST /api/webhook/shopify          - Shopify order events
//! ```

pub mod addresses;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod orders;
pub mod products;
pub mod webhook;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::middleware::{auth_rate_limiter, webhook_rate_limiter};
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
        .layer(auth_rate_limiter())
}

/// Create the address routes router.
pub fn address_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(addresses::list).post(addresses::create))
        .route(
            "/{id}",
            put(addresses::update).delete(addresses::delete),
        )
        .route("/{id}/default", put(addresses::set_default))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::list))
        .route("/{id}", get(orders::get))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::list))
        .route("/{handle}", get(products::get))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(cart::create))
        .route("/{id}", get(cart::get))
        .route("/{id}/add", post(cart::add_lines))
        .route("/{id}/update", post(cart::update_line))
        .route("/{id}/remove", post(cart::remove_lines))
}

/// Create the webhook routes router.
///
/// Mounted without a body-consuming extractor in front, so the handler
/// receives the raw bytes Shopify signed.
pub fn webhook_routes(requests_per_minute: u32) -> Router<AppState> {
    Router::new()
        .route("/shopify", post(webhook::shopify))
        .layer(webhook_rate_limiter(requests_per_minute))
}

/// Assemble all API routes.
pub fn routes(webhook_rpm: u32) -> Router<AppState> {
    Router::new()
        .nest("/api/auth", auth_routes())
        .nest("/api/addresses", address_routes())
        .nest("/api/orders", order_routes())
        .nest("/api/products", product_routes())
        .nest("/api/cart", cart_routes())
        .route("/api/checkout", post(checkout::create))
        .nest("/api/webhook", webhook_routes(webhook_rpm))
}
