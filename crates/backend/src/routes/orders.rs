//! Order query route handlers.
//!
//! Read-only order history for the logged-in user. Orders are written by
//! webhook ingestion only; these endpoints never mutate.

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;

use okome_core::{AddressId, OrderId};

use crate::db::addresses::AddressRepository;
use crate::db::orders::OrderRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::{Address, Order, OrderItem};
use crate::state::AppState;

/// An order with its items and a resolved shipping address.
#[derive(Debug, Serialize)]
pub struct OrderView {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub address: Option<AddressView>,
}

/// Shipping address as shown on an order.
///
/// Either a saved address (with its id) or the order's shipping snapshot
/// shaped the same way with `id: null`, so the frontend renders both
/// identically.
#[derive(Debug, Serialize)]
pub struct AddressView {
    pub id: Option<AddressId>,
    pub recipient_name: Option<String>,
    pub postal_code: Option<String>,
    pub address_1: Option<String>,
    pub address_2: Option<String>,
    pub phone: Option<String>,
}

impl From<Address> for AddressView {
    fn from(a: Address) -> Self {
        Self {
            id: Some(a.id),
            recipient_name: Some(a.recipient_name),
            postal_code: Some(a.postal_code),
            address_1: Some(a.address_1),
            address_2: a.address_2,
            phone: Some(a.phone),
        }
    }
}

/// `GET /api/orders`
///
/// The user's own orders plus guest orders placed under their email.
///
/// # Errors
///
/// `401` when not logged in.
pub async fn list(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Vec<OrderView>>> {
    let repo = OrderRepository::new(state.pool());

    let orders = repo.list_for(user.id, &user.email).await?;

    let ids: Vec<OrderId> = orders.iter().map(|o| o.id).collect();
    let mut items_by_order: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
    for item in repo.items_for_orders(&ids).await? {
        items_by_order.entry(item.order_id).or_default().push(item);
    }

    let mut views = Vec::with_capacity(orders.len());
    for order in orders {
        let items = items_by_order.remove(&order.id).unwrap_or_default();
        let address = resolve_address_view(&state, &order).await?;
        views.push(OrderView {
            order,
            items,
            address,
        });
    }

    Ok(Json(views))
}

/// `GET /api/orders/{id}`
///
/// # Errors
///
/// `404` when the order does not exist, `403` when it exists but belongs to
/// someone else.
pub async fn get(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(order_id): Path<OrderId>,
) -> Result<Json<OrderView>> {
    let repo = OrderRepository::new(state.pool());

    let order = repo
        .get(order_id)
        .await?
        .ok_or_else(|| AppError::NotFound("order not found".to_owned()))?;

    let owned = order.user_id == Some(user.id)
        || (order.user_id.is_none() && order.email.as_deref() == Some(user.email.as_str()));
    if !owned {
        return Err(AppError::Forbidden("not your order".to_owned()));
    }

    let items = repo.items_for(order.id).await?;
    let address = resolve_address_view(&state, &order).await?;

    Ok(Json(OrderView {
        order,
        items,
        address,
    }))
}

/// Resolve the address shown on an order: the linked saved address when one
/// still exists, otherwise the shipping snapshot captured at order time.
async fn resolve_address_view(state: &AppState, order: &Order) -> Result<Option<AddressView>> {
    if let (Some(user_id), Some(address_id)) = (order.user_id, order.address_id)
        && let Some(address) = AddressRepository::new(state.pool())
            .find_owned(user_id, address_id)
            .await?
    {
        return Ok(Some(address.into()));
    }

    Ok(order.shipping_snapshot().map(|s| AddressView {
        id: None,
        recipient_name: s.name,
        postal_code: s.postal_code,
        address_1: s.address_1,
        address_2: s.address_2,
        phone: s.phone,
    }))
}
