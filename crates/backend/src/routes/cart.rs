//! Cart route handlers.
//!
//! Proxies the Shopify Storefront cart API. Carts live entirely in
//! Shopify; these endpoints only normalize the line inputs (frontend sends
//! `variantId`, Storefront wants `merchandiseId`) and pass the cart shape
//! through. Requires a session so carts are tied to a customer.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::shopify::client::{Cart, CartLineInput};
use crate::state::AppState;

/// One line as the frontend sends it.
#[derive(Debug, Deserialize)]
pub struct LineRequest {
    #[serde(rename = "variantId", default)]
    pub variant_id: Option<String>,
    #[serde(default)]
    pub quantity: Option<i64>,
}

/// Request body for cart creation and line addition.
#[derive(Debug, Default, Deserialize)]
pub struct LinesRequest {
    #[serde(default)]
    pub lines: Vec<LineRequest>,
}

/// Request body for a single-line quantity update.
#[derive(Debug, Deserialize)]
pub struct UpdateLineRequest {
    #[serde(rename = "lineId")]
    pub line_id: String,
    pub quantity: i64,
}

/// Request body for line removal.
#[derive(Debug, Deserialize)]
pub struct RemoveLinesRequest {
    #[serde(rename = "lineIds", default)]
    pub line_ids: Vec<String>,
}

/// Drop lines without a variant or with a non-positive quantity, and map
/// the rest to Storefront inputs.
fn normalize_lines(lines: &[LineRequest]) -> Vec<CartLineInput> {
    lines
        .iter()
        .filter_map(|l| {
            let merchandise_id = l.variant_id.as_deref()?.trim();
            let quantity = l.quantity.unwrap_or(1);
            (!merchandise_id.is_empty() && quantity > 0).then(|| CartLineInput {
                merchandise_id: merchandise_id.to_owned(),
                quantity,
            })
        })
        .collect()
}

/// `POST /api/cart`
///
/// # Errors
///
/// `502` when Shopify rejects or cannot be reached.
pub async fn create(
    State(state): State<AppState>,
    RequireUser(_user): RequireUser,
    Json(body): Json<LinesRequest>,
) -> Result<Json<Cart>> {
    let lines = normalize_lines(&body.lines);
    let cart = state.storefront().cart_create(&lines).await?;
    Ok(Json(cart))
}

/// `GET /api/cart/{id}`
///
/// # Errors
///
/// `404` when the cart does not exist or has expired, `502` when Shopify
/// rejects or cannot be reached.
pub async fn get(
    State(state): State<AppState>,
    RequireUser(_user): RequireUser,
    Path(id): Path<String>,
) -> Result<Json<Cart>> {
    let cart = state
        .storefront()
        .cart(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("cart not found".to_owned()))?;

    Ok(Json(cart))
}

/// `POST /api/cart/{id}/add`
///
/// # Errors
///
/// `400` when no usable line survives normalization, `502` when Shopify
/// rejects or cannot be reached.
pub async fn add_lines(
    State(state): State<AppState>,
    RequireUser(_user): RequireUser,
    Path(id): Path<String>,
    Json(body): Json<LinesRequest>,
) -> Result<Json<Cart>> {
    let lines = normalize_lines(&body.lines);
    if lines.is_empty() {
        return Err(AppError::Validation("lines must not be empty".to_owned()));
    }

    let cart = state.storefront().cart_lines_add(&id, &lines).await?;
    Ok(Json(cart))
}

/// `POST /api/cart/{id}/update`
///
/// # Errors
///
/// `400` for a blank line id, `502` when Shopify rejects or cannot be
/// reached. A quantity of zero removes the line, Storefront-side.
pub async fn update_line(
    State(state): State<AppState>,
    RequireUser(_user): RequireUser,
    Path(id): Path<String>,
    Json(body): Json<UpdateLineRequest>,
) -> Result<Json<Cart>> {
    if body.line_id.trim().is_empty() {
        return Err(AppError::Validation("lineId must not be blank".to_owned()));
    }

    let cart = state
        .storefront()
        .cart_lines_update(&id, &body.line_id, body.quantity)
        .await?;

    Ok(Json(cart))
}

/// `POST /api/cart/{id}/remove`
///
/// # Errors
///
/// `400` for an empty `lineIds` list, `502` when Shopify rejects or
/// cannot be reached.
pub async fn remove_lines(
    State(state): State<AppState>,
    RequireUser(_user): RequireUser,
    Path(id): Path<String>,
    Json(body): Json<RemoveLinesRequest>,
) -> Result<Json<Cart>> {
    if body.line_ids.is_empty() {
        return Err(AppError::Validation("lineIds must not be empty".to_owned()));
    }

    let cart = state
        .storefront()
        .cart_lines_remove(&id, &body.line_ids)
        .await?;

    Ok(Json(cart))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_drops_unusable_lines() {
        let lines = vec![
            LineRequest {
                variant_id: Some("gid://shopify/ProductVariant/1".to_owned()),
                quantity: Some(2),
            },
            LineRequest {
                variant_id: Some(String::new()),
                quantity: Some(1),
            },
            LineRequest {
                variant_id: Some("gid://shopify/ProductVariant/2".to_owned()),
                quantity: Some(0),
            },
            LineRequest {
                variant_id: None,
                quantity: Some(3),
            },
        ];

        let normalized = normalize_lines(&lines);
        assert_eq!(normalized.len(), 1);
        assert_eq!(normalized[0].merchandise_id, "gid://shopify/ProductVariant/1");
        assert_eq!(normalized[0].quantity, 2);
    }

    #[test]
    fn test_normalize_defaults_quantity_to_one() {
        let lines = vec![LineRequest {
            variant_id: Some("gid://shopify/ProductVariant/1".to_owned()),
            quantity: None,
        }];

        assert_eq!(normalize_lines(&lines)[0].quantity, 1);
    }
}
