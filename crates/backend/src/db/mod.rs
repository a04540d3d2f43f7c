//! Database access for the backend `PostgreSQL` instance.
//!
//! ## Tables
//!
//! - `users` - Registered accounts
//! - `user_addresses` - Shipping addresses (one default per user)
//! - `orders` / `order_items` - Shopify orders mirrored by webhook ingestion
//! - `webhook_logs` - Append-only webhook audit trail
//! - `sessions` - Tower-sessions storage
//!
//! Migrations live in `crates/backend/migrations/` and are applied at
//! startup via `sqlx::migrate!`.

pub mod addresses;
pub mod orders;
pub mod users;
pub mod webhook_logs;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Errors from repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
