//! Order query handlers (read-only projections).

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;

use crate::error::ApiError;
use crate::state::AppState;
use sevmart_core::validation::validate_id;
use sevmart_core::Order;

/// Gets a full order by id.
pub async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    validate_id("orderId", &order_id)?;

    let order = state
        .db
        .orders()
        .get_by_id(&order_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Order", &order_id))?;

    Ok(Json(order))
}

/// Lists a customer's orders, newest first.
pub async fn list_customer_orders(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<String>,
) -> Result<Json<Vec<Order>>, ApiError> {
    validate_id("customerId", &customer_id)?;

    let orders = state.db.orders().list_by_customer(&customer_id).await?;

    Ok(Json(orders))
}
