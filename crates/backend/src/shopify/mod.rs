//! Shopify integration: webhook signature verification, payload parsing,
//! and the Storefront API client behind the product, cart and checkout
//! endpoints.

pub mod client;
pub mod payload;
pub mod verify;

pub use client::StorefrontClient;
pub use payload::OrderPayload;
pub use verify::SignatureVerifier;

/// Errors from Shopify API interactions.
#[derive(Debug, thiserror::Error)]
pub enum ShopifyError {
    /// HTTP transport error talking to Shopify.
    #[error("shopify request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Shopify returned a non-success HTTP status.
    #[error("shopify returned status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// GraphQL-level errors in an otherwise successful response.
    #[error("shopify graphql errors: {0}")]
    Graphql(String),

    /// Response shape did not match what we expect.
    #[error("unexpected shopify response: {0}")]
    UnexpectedResponse(String),
}
