//! Product catalog route handlers.
//!
//! Thin proxies over the Shopify Storefront API: the catalog lives in
//! Shopify, these endpoints only reshape the GraphQL responses for the
//! frontend. Public, no session required.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::error::{AppError, Result};
use crate::shopify::client::{ProductDetail, ProductSummary};
use crate::state::AppState;

/// `GET /api/products`
///
/// # Errors
///
/// `502` when Shopify rejects or cannot be reached.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<ProductSummary>>> {
    let products = state.storefront().list_products().await?;
    Ok(Json(products))
}

/// `GET /api/products/{handle}`
///
/// # Errors
///
/// `400` for a blank handle, `404` when Shopify knows no such product,
/// `502` when Shopify rejects or cannot be reached.
pub async fn get(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> Result<Json<ProductDetail>> {
    if handle.trim().is_empty() {
        return Err(AppError::Validation("handle must not be blank".to_owned()));
    }

    let product = state
        .storefront()
        .product_by_handle(&handle)
        .await?
        .ok_or_else(|| AppError::NotFound("product not found".to_owned()))?;

    Ok(Json(product))
}
