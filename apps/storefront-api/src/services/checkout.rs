//! Checkout orchestration.
//!
//! Converts a user's active cart into an order with a payable QR request:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Checkout Sequence                                 │
//! │                                                                         │
//! │  1. Load cart, reject empty carts up front (no zero-đồng orders)       │
//! │  2. checkout(cart_id)      - conditional flip; a concurrent or         │
//! │     repeated checkout loses here with a conflict, so at most one       │
//! │     order is ever created per cart                                     │
//! │  3. orders().create(...)   - lines frozen, total fixed at creation     │
//! │  4. attach payment request - SEVQR code + QR URL, write-once;          │
//! │     a code collision retries with a longer id suffix                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::{info, warn};

use crate::error::ApiError;
use sevmart_core::payment::{payment_request_for, BankAccount, DEFAULT_CODE_SUFFIX_LEN};
use sevmart_core::{Order, ShippingAddress};
use sevmart_db::{Database, DbError, NewOrderItem};

/// Longest id suffix tried before giving up on code generation.
const MAX_CODE_SUFFIX_LEN: usize = DEFAULT_CODE_SUFFIX_LEN + 4;

/// Checks out a cart and creates its order with a payment request attached.
pub async fn checkout_cart(
    db: &Database,
    bank: &BankAccount,
    cart_id: &str,
    shipping: ShippingAddress,
) -> Result<Order, ApiError> {
    let cart = db
        .carts()
        .get_by_id(cart_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Cart", cart_id))?;

    if cart.is_empty() {
        return Err(ApiError::validation("Cart has no items to check out"));
    }

    // Conditional flip: fails with a conflict on anything but an active cart,
    // so a double submit can never create a second order.
    let cart = db.carts().checkout(cart_id).await?;

    let items = cart
        .items
        .iter()
        .map(|line| NewOrderItem {
            product_id: line.product_id.clone(),
            name: line.name.clone(),
            unit_price: line.unit_price,
            quantity: line.quantity,
        })
        .collect();

    let order = db.orders().create(&cart.user_id, items, &shipping).await?;
    info!(order_id = %order.id, cart_id = %cart.id, total = order.total_amount, "Order created from cart");

    attach_payment_request(db, bank, &order).await
}

/// Generates and persists the payment request for an order.
///
/// Generation is retryable: when the 6-character id suffix collides with
/// another order's code (unique index), the suffix is lengthened and the
/// request regenerated. An order that already carries a code gets it back
/// unchanged (write-once).
pub async fn attach_payment_request(
    db: &Database,
    bank: &BankAccount,
    order: &Order,
) -> Result<Order, ApiError> {
    let mut suffix_len = DEFAULT_CODE_SUFFIX_LEN;

    loop {
        let request = payment_request_for(order, bank, suffix_len)?;

        match db.orders().set_payment_request(&order.id, &request).await {
            Ok(saved) => return Ok(saved),
            Err(DbError::UniqueViolation { .. }) if suffix_len < MAX_CODE_SUFFIX_LEN => {
                suffix_len += 2;
                warn!(
                    order_id = %order.id,
                    payment_code = %request.payment_code,
                    retry_suffix_len = suffix_len,
                    "Payment code collision, retrying with longer suffix"
                );
            }
            Err(e) => return Err(e.into()),
        }
    }
}
