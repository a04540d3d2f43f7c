//! Checkout route handler.
//!
//! Creates a Shopify checkout for the submitted lines and hands the hosted
//! payment URL back to the frontend. Works for guests; a logged-in user's
//! email is attached so the resulting order links back on webhook
//! ingestion, and their shipping address (the requested one if owned,
//! otherwise default, otherwise oldest) is pre-filled into the checkout.

use axum::{Json, extract::State};

use okome_core::AddressId;

use crate::db::addresses::AddressRepository;
use crate::error::{AppError, Result};
use crate::middleware::OptionalUser;
use crate::shopify::client::{Checkout, CheckoutAddress, CheckoutLine};
use crate::state::AppState;

/// Request body for checkout creation.
#[derive(Debug, serde::Deserialize)]
pub struct CheckoutRequest {
    pub lines: Vec<CheckoutLine>,
    /// Preferred shipping address; ignored for guests, falls back to the
    /// default address when absent or not owned.
    #[serde(default)]
    pub address_id: Option<AddressId>,
}

/// `POST /api/checkout`
///
/// # Errors
///
/// `400` for an empty cart or non-positive quantity, `502` when Shopify
/// rejects or cannot be reached.
pub async fn create(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    Json(body): Json<CheckoutRequest>,
) -> Result<Json<Checkout>> {
    if body.lines.is_empty() {
        return Err(AppError::Validation("cart is empty".to_owned()));
    }
    if body.lines.iter().any(|l| l.quantity < 1) {
        return Err(AppError::Validation("quantity must be at least 1".to_owned()));
    }

    let email = user.as_ref().map(|u| u.email.as_str());

    let mut shipping = None;
    if let Some(user) = user.as_ref() {
        let addresses = AddressRepository::new(state.pool());
        if let Some(id) = addresses.resolve(user.id, body.address_id).await?
            && let Some(address) = addresses.find_owned(user.id, id).await?
        {
            shipping = Some(CheckoutAddress::from(&address));
        }
    }

    let checkout = state
        .storefront()
        .create_checkout(&body.lines, email, shipping.as_ref())
        .await?;

    Ok(Json(checkout))
}
