//! HTTP routing for the storefront API.
//!
//! ## Route Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Storefront Routes                               │
//! │                                                                         │
//! │  Cart (user-keyed)          GET    /cart/{user_id}                     │
//! │                             POST   /cart/{user_id}/items               │
//! │  Cart (document-keyed)      PUT    /carts/{cart_id}/items/{product_id} │
//! │                             DELETE /carts/{cart_id}/items/{product_id} │
//! │                             POST   /carts/{cart_id}/checkout           │
//! │                                                                         │
//! │  Payment                    POST   /payment/generate-qr                │
//! │                             GET    /payment/order-status/{order_id}    │
//! │                             POST   /payment/webhook                    │
//! │                                                                         │
//! │  Orders                     GET    /orders/{order_id}                  │
//! │                             GET    /orders/customer/{customer_id}      │
//! │                                                                         │
//! │  Ops                        GET    /health                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod cart;
pub mod orders;
pub mod payment;

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;

use crate::state::AppState;

/// Builds the application router over the shared state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/cart/{user_id}", get(cart::get_active_cart))
        .route("/cart/{user_id}/items", post(cart::add_item))
        .route(
            "/carts/{cart_id}/items/{product_id}",
            put(cart::update_item).delete(cart::remove_item),
        )
        .route("/carts/{cart_id}/checkout", post(cart::checkout))
        .route("/payment/generate-qr", post(payment::generate_qr))
        .route("/payment/order-status/{order_id}", get(payment::order_status))
        .route("/payment/webhook", post(payment::webhook))
        .route("/orders/{order_id}", get(orders::get_order))
        .route("/orders/customer/{customer_id}", get(orders::list_customer_orders))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use crate::services::notify::Notifier;
    use sevmart_core::payment::BankAccount;
    use sevmart_db::{Database, DbConfig};

    /// Route registration panics on conflicting paths; building the full
    /// router once keeps that from reaching production.
    #[tokio::test]
    async fn test_router_builds() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let state = Arc::new(AppState {
            db,
            config: ApiConfig {
                http_port: 0,
                database_path: ":memory:".to_string(),
                bank: BankAccount {
                    bank_code: "970436".to_string(),
                    account_no: "0011002233445".to_string(),
                    account_name: "SEVMART JSC".to_string(),
                },
            },
            notifier: Notifier::new(),
        });

        let _router = router(state);
    }
}
