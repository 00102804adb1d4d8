//! Cart HTTP handlers.
//!
//! ## Route Map
//! ```text
//! GET    /cart/{user_id}                      → the user's active cart
//! POST   /cart/{user_id}/items                → add item (price snapshotted
//!                                               from the catalog)
//! PUT    /carts/{cart_id}/items/{product_id}  → absolute quantity update
//! DELETE /carts/{cart_id}/items/{product_id}  → remove line
//! POST   /carts/{cart_id}/checkout            → cart → order + QR request
//! ```
//!
//! `/cart/{user_id}` addresses the user's single active cart; `/carts/...`
//! addresses a concrete cart document by id.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use tracing::debug;

use crate::error::ApiError;
use crate::services::checkout::checkout_cart;
use crate::state::AppState;
use sevmart_core::validation::{validate_id, validate_quantity};
use sevmart_core::{Cart, Order, ShippingAddress};

/// Request body for adding an item to the cart.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub product_id: String,
    /// Defaults to 1 when omitted.
    pub quantity: Option<i64>,
}

/// Request body for an absolute quantity update.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    pub quantity: i64,
}

/// Gets the user's active cart.
pub async fn get_active_cart(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Cart>, ApiError> {
    validate_id("userId", &user_id)?;

    let cart = state
        .db
        .carts()
        .get_active_cart(&user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Active cart for user", &user_id))?;

    Ok(Json(cart))
}

/// Adds a product to the user's active cart (created on first add).
///
/// The catalog is consulted here: the product must exist and be active, and
/// its current price is frozen into the cart line.
pub async fn add_item(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(body): Json<AddItemRequest>,
) -> Result<Json<Cart>, ApiError> {
    let quantity = body.quantity.unwrap_or(1);
    debug!(user_id = %user_id, product_id = %body.product_id, quantity = %quantity, "add_item");

    validate_id("userId", &user_id)?;
    validate_id("productId", &body.product_id)?;
    validate_quantity(quantity)?;

    let product = state
        .db
        .products()
        .get_by_id(&body.product_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", &body.product_id))?;

    if !product.is_active {
        return Err(ApiError::validation("Product is not available for sale"));
    }

    let cart = state
        .db
        .carts()
        .add_item(&user_id, &product.id, &product.name, product.price, quantity)
        .await?;

    Ok(Json(cart))
}

/// Sets a cart line's quantity to an absolute value.
pub async fn update_item(
    State(state): State<Arc<AppState>>,
    Path((cart_id, product_id)): Path<(String, String)>,
    Json(body): Json<UpdateItemRequest>,
) -> Result<Json<Cart>, ApiError> {
    debug!(cart_id = %cart_id, product_id = %product_id, quantity = %body.quantity, "update_item");

    validate_id("cartId", &cart_id)?;
    validate_id("productId", &product_id)?;
    validate_quantity(body.quantity)?;

    let cart = state
        .db
        .carts()
        .update_item(&cart_id, &product_id, body.quantity)
        .await?;

    Ok(Json(cart))
}

/// Removes a line from the cart.
pub async fn remove_item(
    State(state): State<Arc<AppState>>,
    Path((cart_id, product_id)): Path<(String, String)>,
) -> Result<Json<Cart>, ApiError> {
    debug!(cart_id = %cart_id, product_id = %product_id, "remove_item");

    validate_id("cartId", &cart_id)?;
    validate_id("productId", &product_id)?;

    let cart = state.db.carts().remove_item(&cart_id, &product_id).await?;

    Ok(Json(cart))
}

/// Checks out a cart: flips it to `checked_out`, creates the order with a
/// fixed total, and attaches the QR payment request.
pub async fn checkout(
    State(state): State<Arc<AppState>>,
    Path(cart_id): Path<String>,
    Json(shipping): Json<ShippingAddress>,
) -> Result<Json<Order>, ApiError> {
    debug!(cart_id = %cart_id, "checkout");

    validate_id("cartId", &cart_id)?;
    if shipping.receiver.trim().is_empty() || shipping.address.trim().is_empty() {
        return Err(ApiError::validation("Shipping receiver and address are required"));
    }

    let order = checkout_cart(&state.db, &state.config.bank, &cart_id, shipping).await?;

    Ok(Json(order))
}
