//! Address route handlers.
//!
//! CRUD over the logged-in user's shipping addresses plus the set-default
//! operation. All handlers require authentication; ownership is enforced in
//! the repository queries, so a foreign address id behaves like a missing
//! one.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use okome_core::AddressId;

use crate::db::addresses::{AddressInput, AddressRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::Address;
use crate::state::AppState;

/// `GET /api/addresses`
///
/// # Errors
///
/// `401` when not logged in.
pub async fn list(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Vec<Address>>> {
    let addresses = AddressRepository::new(state.pool()).list(user.id).await?;

    Ok(Json(addresses))
}

/// `POST /api/addresses`
///
/// # Errors
///
/// `400` when a required field is blank.
pub async fn create(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(input): Json<AddressInput>,
) -> Result<(StatusCode, Json<Address>)> {
    validate(&input)?;

    let address = AddressRepository::new(state.pool())
        .create(user.id, &input)
        .await?;

    Ok((StatusCode::CREATED, Json(address)))
}

/// `PUT /api/addresses/{id}`
///
/// # Errors
///
/// `400` when a required field is blank, `404` when the address does not
/// exist or belongs to another user.
pub async fn update(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(address_id): Path<AddressId>,
    Json(input): Json<AddressInput>,
) -> Result<Json<Address>> {
    validate(&input)?;

    let address = AddressRepository::new(state.pool())
        .update(user.id, address_id, &input)
        .await?
        .ok_or_else(|| AppError::NotFound("address not found".to_owned()))?;

    Ok(Json(address))
}

/// `DELETE /api/addresses/{id}`
///
/// # Errors
///
/// `404` when the address does not exist or belongs to another user.
pub async fn delete(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(address_id): Path<AddressId>,
) -> Result<StatusCode> {
    let deleted = AddressRepository::new(state.pool())
        .delete(user.id, address_id)
        .await?;

    if !deleted {
        return Err(AppError::NotFound("address not found".to_owned()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// `PUT /api/addresses/{id}/default`
///
/// # Errors
///
/// `404` when the address does not exist or belongs to another user.
pub async fn set_default(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(address_id): Path<AddressId>,
) -> Result<Json<Address>> {
    let address = AddressRepository::new(state.pool())
        .set_default(user.id, address_id)
        .await?
        .ok_or_else(|| AppError::NotFound("address not found".to_owned()))?;

    Ok(Json(address))
}

fn validate(input: &AddressInput) -> Result<()> {
    if !input.is_valid() {
        return Err(AppError::Validation(
            "recipient_name, postal_code, address_1, and phone are required".to_owned(),
        ));
    }
    Ok(())
}
