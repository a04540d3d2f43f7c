//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::BackendConfig;
use crate::shopify::{SignatureVerifier, StorefrontClient};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: BackendConfig,
    pool: PgPool,
    storefront: StorefrontClient,
    verifier: SignatureVerifier,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: BackendConfig, pool: PgPool) -> Self {
        let storefront = StorefrontClient::new(&config.shopify);
        let verifier = SignatureVerifier::new(config.shopify.webhook_secret.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                storefront,
                verifier,
            }),
        }
    }

    /// Get a reference to the backend configuration.
    #[must_use]
    pub fn config(&self) -> &BackendConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the Shopify Storefront API client.
    #[must_use]
    pub fn storefront(&self) -> &StorefrontClient {
        &self.inner.storefront
    }

    /// Get a reference to the webhook signature verifier.
    #[must_use]
    pub fn verifier(&self) -> &SignatureVerifier {
        &self.inner.verifier
    }
}
