//! # Domain Types
//!
//! Core domain types for the Sevmart storefront.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Cart        │   │     Order       │   │    Product      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  user_id        │   │  customer_id    │   │  name           │       │
//! │  │  status         │   │  status x2      │   │  price          │       │
//! │  │  items[]        │   │  items[]        │   │  is_active      │       │
//! │  │  total_amount   │   │  total_amount   │   └─────────────────┘       │
//! │  └─────────────────┘   │  payment {...}  │                             │
//! │                        └─────────────────┘                             │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   CartStatus    │   │   OrderStatus   │   │  PaymentStatus  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Active         │   │  Pending        │   │  Pending        │       │
//! │  │  CheckedOut     │   │  Confirmed      │   │  Paid           │       │
//! │  │  Abandoned      │   │  Shipping       │   │  Failed         │       │
//! │  └─────────────────┘   │  Delivered      │   └─────────────────┘       │
//! │                        │  Cancelled      │                             │
//! │                        └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! Cart lines and order items freeze the product name and unit price at the
//! moment they are created. Later catalog price changes never retroactively
//! alter a cart total or an order's history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::{cart_total, Money};
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

// =============================================================================
// Cart Status
// =============================================================================

/// Lifecycle status of a cart.
///
/// A cart is `Active` while the customer shops, becomes `CheckedOut` exactly
/// once (terminal for that cart instance; a fresh cart is created for the next
/// purchase), or is swept to `Abandoned` by housekeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CartStatus {
    /// Cart is open for mutation.
    Active,
    /// Cart was converted into an order.
    CheckedOut,
    /// Cart was abandoned without checkout.
    Abandoned,
}

impl Default for CartStatus {
    fn default() -> Self {
        CartStatus::Active
    }
}

impl CartStatus {
    /// Lowercase storage form, used in conditional SQL updates and messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            CartStatus::Active => "active",
            CartStatus::CheckedOut => "checked_out",
            CartStatus::Abandoned => "abandoned",
        }
    }
}

// =============================================================================
// Cart Line Item
// =============================================================================

/// A line in a cart, unique per product.
///
/// ## Design Notes
/// - `product_id`: Reference to the catalog product
/// - `name` / `unit_price`: Frozen copies taken at add time. The cart keeps
///   displaying (and totalling) consistent data even if the catalog product
///   is updated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    /// Product ID (UUID).
    pub product_id: String,

    /// Product name at time of adding (frozen).
    pub name: String,

    /// Unit price in đồng at time of adding (frozen).
    pub unit_price: i64,

    /// Quantity in cart (always positive).
    pub quantity: i64,

    /// When this line was first added.
    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl CartLineItem {
    /// Creates a new cart line with a price snapshot.
    pub fn new(
        product_id: impl Into<String>,
        name: impl Into<String>,
        unit_price: i64,
        quantity: i64,
        added_at: DateTime<Utc>,
    ) -> Self {
        CartLineItem {
            product_id: product_id.into(),
            name: name.into(),
            unit_price,
            quantity,
            added_at,
        }
    }

    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_vnd(self.unit_price)
    }

    /// Returns the line total (unit price × quantity).
    pub fn line_total(&self) -> CoreResult<Money> {
        crate::money::line_total(self.unit_price(), self.quantity)
    }
}

// =============================================================================
// Cart
// =============================================================================

/// A per-user mutable collection of pending purchase lines.
///
/// ## Invariants
/// - Lines are unique by `product_id` (adding the same product increments its
///   quantity instead of appending a duplicate line)
/// - Every line quantity is positive; non-positive updates are rejected
/// - `total_amount` always equals the fold of `unit_price × quantity` over
///   `items`; it is recomputed after every mutation, never patched with deltas
/// - At most one `Active` cart exists per user (enforced by the store layer
///   with a unique index; this type only models a single cart instance)
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Owning user.
    pub user_id: String,

    /// Lifecycle status.
    pub status: CartStatus,

    /// Lines in the cart.
    pub items: Vec<CartLineItem>,

    /// Aggregate total in đồng. Always `Σ item.unit_price * item.quantity`.
    pub total_amount: i64,

    /// When the cart was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// When the cart was last mutated.
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    /// Creates a new empty active cart.
    ///
    /// Identifiers and timestamps are supplied by the caller; this crate
    /// performs no I/O and reads no clocks.
    pub fn new(id: impl Into<String>, user_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Cart {
            id: id.into(),
            user_id: user_id.into(),
            status: CartStatus::Active,
            items: Vec::new(),
            total_amount: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the aggregate total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_vnd(self.total_amount)
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the line for a product, if present.
    pub fn line(&self, product_id: &str) -> Option<&CartLineItem> {
        self.items.iter().find(|i| i.product_id == product_id)
    }

    /// Adds a product to the cart or increments its quantity if already present.
    ///
    /// ## Behavior
    /// - If the product already has a line: its quantity is incremented
    /// - Otherwise: a new line is appended with the given price snapshot
    /// - `total_amount` is recomputed from the line list afterwards
    pub fn add_line(
        &mut self,
        product_id: &str,
        name: &str,
        unit_price: i64,
        quantity: i64,
        now: DateTime<Utc>,
    ) -> CoreResult<()> {
        self.ensure_active()?;
        if quantity <= 0 {
            return Err(CoreError::InvalidQuantity { quantity });
        }
        if unit_price < 0 {
            return Err(CoreError::InvalidPrice { price: unit_price });
        }

        if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product_id) {
            let new_qty = item.quantity + quantity;
            if new_qty > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            item.quantity = new_qty;
        } else {
            if self.items.len() >= MAX_CART_ITEMS {
                return Err(CoreError::CartTooLarge {
                    max: MAX_CART_ITEMS,
                });
            }
            if quantity > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: quantity,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            self.items
                .push(CartLineItem::new(product_id, name, unit_price, quantity, now));
        }

        self.recompute_total()?;
        self.updated_at = now;
        Ok(())
    }

    /// Sets a line's quantity to an absolute value.
    ///
    /// Non-positive quantities are rejected with `InvalidQuantity`; removal is
    /// only ever the explicit [`Cart::remove_line`] operation.
    pub fn set_line_quantity(
        &mut self,
        product_id: &str,
        quantity: i64,
        now: DateTime<Utc>,
    ) -> CoreResult<()> {
        self.ensure_active()?;
        if quantity <= 0 {
            return Err(CoreError::InvalidQuantity { quantity });
        }
        if quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }

        let item = self
            .items
            .iter_mut()
            .find(|i| i.product_id == product_id)
            .ok_or_else(|| CoreError::ItemNotFound {
                product_id: product_id.to_string(),
            })?;
        item.quantity = quantity;

        self.recompute_total()?;
        self.updated_at = now;
        Ok(())
    }

    /// Removes a line from the cart.
    pub fn remove_line(&mut self, product_id: &str, now: DateTime<Utc>) -> CoreResult<()> {
        self.ensure_active()?;
        let before = self.items.len();
        self.items.retain(|i| i.product_id != product_id);
        if self.items.len() == before {
            return Err(CoreError::ItemNotFound {
                product_id: product_id.to_string(),
            });
        }

        self.recompute_total()?;
        self.updated_at = now;
        Ok(())
    }

    /// Transitions the cart to `CheckedOut`.
    ///
    /// NOT idempotent by contract: a second checkout on the same cart fails
    /// with `CartNotActive` so a caller layer can never create two orders
    /// from one cart.
    pub fn begin_checkout(&mut self, now: DateTime<Utc>) -> CoreResult<()> {
        self.ensure_active()?;
        self.status = CartStatus::CheckedOut;
        self.updated_at = now;
        Ok(())
    }

    /// Recomputes `total_amount` from the line list (pure fold).
    fn recompute_total(&mut self) -> CoreResult<()> {
        self.total_amount = cart_total(&self.items)?.vnd();
        Ok(())
    }

    fn ensure_active(&self) -> CoreResult<()> {
        if self.status != CartStatus::Active {
            return Err(CoreError::CartNotActive {
                cart_id: self.id.clone(),
                current_status: self.status.as_str().to_string(),
            });
        }
        Ok(())
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// Fulfillment status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Order created, awaiting payment.
    Pending,
    /// Payment reconciled; order confirmed for fulfillment.
    Confirmed,
    /// Order handed to the courier.
    Shipping,
    /// Order delivered to the customer.
    Delivered,
    /// Order cancelled.
    Cancelled,
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

// =============================================================================
// Payment Status
// =============================================================================

/// Payment status of an order.
///
/// The reconciliation engine performs exactly one transition:
/// `Pending → Paid`. `Failed` is set by out-of-band support tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "PascalCase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Pending
    }
}

// =============================================================================
// Order Item
// =============================================================================

/// A line item in an order.
/// Uses the snapshot pattern to freeze product data at checkout time.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    /// Product name at checkout time (frozen).
    pub name: String,
    /// Unit price in đồng at checkout time (frozen).
    pub unit_price: i64,
    /// Quantity ordered.
    pub quantity: i64,
}

impl OrderItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_vnd(self.unit_price)
    }
}

// =============================================================================
// Shipping Address
// =============================================================================

/// Shipping address snapshot captured at checkout.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    /// Receiver full name.
    pub receiver: String,
    /// Contact phone number.
    pub phone: String,
    /// Free-form delivery address.
    pub address: String,
}

// =============================================================================
// Payment Info
// =============================================================================

/// Payment-reconciliation sub-record of an order.
///
/// `payment_code`, once set, is immutable and globally unique: it is the
/// correlation key the reconciliation engine matches inbound bank transfers
/// against.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInfo {
    /// Scheme-prefixed public payment code (e.g. `SEVQRAB12CD`).
    pub payment_code: Option<String>,

    /// QR image URL presented to the customer.
    pub qr_url: Option<String>,

    /// When the payment was reconciled.
    #[ts(as = "Option<String>")]
    pub paid_at: Option<DateTime<Utc>>,

    /// Bank-side reference code of the matched transfer.
    pub reference_code: Option<String>,

    /// Raw webhook payload stored for audit.
    pub raw_webhook_payload: Option<String>,
}

// =============================================================================
// Order
// =============================================================================

/// An immutable-at-creation record of a completed checkout.
///
/// `total_amount` is fixed when the order is created from the checked-out
/// cart and is never recomputed from line items afterwards. Only the
/// reconciliation engine mutates `payment_status` / `status` / `payment`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub customer_id: String,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    /// Total in đồng, fixed at creation.
    pub total_amount: i64,
    pub items: Vec<OrderItem>,
    pub shipping: ShippingAddress,
    pub payment: PaymentInfo,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Returns the order total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_vnd(self.total_amount)
    }

    /// Checks whether the order has been paid.
    #[inline]
    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }
}

// =============================================================================
// Product (catalog collaborator)
// =============================================================================

/// A catalog product, read-only from this core's perspective.
///
/// Cart operations snapshot `price` into line items; later catalog changes
/// never alter historical totals.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Optional description.
    pub description: Option<String>,

    /// Price in đồng.
    pub price: i64,

    /// Sales unit ("kg", "bó", "hộp", ...).
    pub unit: Option<String>,

    /// Whether the product is purchasable (soft delete).
    pub is_active: bool,

    /// When the product was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_vnd(self.price)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn cart() -> Cart {
        Cart::new("cart-1", "user-1", Utc::now())
    }

    #[test]
    fn test_add_line_appends_and_totals() {
        let mut c = cart();
        c.add_line("p-1", "Gạo ST25 5kg", 150_000, 1, Utc::now()).unwrap();
        c.add_line("p-2", "Trứng gà (10)", 32_000, 2, Utc::now()).unwrap();

        assert_eq!(c.items.len(), 2);
        assert_eq!(c.total_amount, 214_000);
    }

    #[test]
    fn test_add_same_product_increments_quantity() {
        let mut c = cart();
        c.add_line("p-1", "Gạo ST25 5kg", 150_000, 2, Utc::now()).unwrap();
        c.add_line("p-1", "Gạo ST25 5kg", 150_000, 3, Utc::now()).unwrap();

        // One line, quantity 5, not two lines
        assert_eq!(c.items.len(), 1);
        assert_eq!(c.line("p-1").unwrap().quantity, 5);
        assert_eq!(c.total_amount, 750_000);
    }

    #[test]
    fn test_add_line_rejects_bad_input() {
        let mut c = cart();
        assert!(matches!(
            c.add_line("p-1", "Gạo", 150_000, 0, Utc::now()),
            Err(CoreError::InvalidQuantity { .. })
        ));
        assert!(matches!(
            c.add_line("p-1", "Gạo", -5, 1, Utc::now()),
            Err(CoreError::InvalidPrice { .. })
        ));
        assert!(c.is_empty());
        assert_eq!(c.total_amount, 0);
    }

    #[test]
    fn test_set_line_quantity_is_absolute() {
        let mut c = cart();
        c.add_line("p-1", "Gạo ST25 5kg", 150_000, 2, Utc::now()).unwrap();
        c.set_line_quantity("p-1", 7, Utc::now()).unwrap();

        assert_eq!(c.line("p-1").unwrap().quantity, 7);
        assert_eq!(c.total_amount, 1_050_000);
    }

    #[test]
    fn test_set_line_quantity_rejects_non_positive() {
        let mut c = cart();
        c.add_line("p-1", "Gạo ST25 5kg", 150_000, 2, Utc::now()).unwrap();

        assert!(matches!(
            c.set_line_quantity("p-1", 0, Utc::now()),
            Err(CoreError::InvalidQuantity { quantity: 0 })
        ));
        // Cart unchanged
        assert_eq!(c.line("p-1").unwrap().quantity, 2);
        assert_eq!(c.total_amount, 300_000);
    }

    #[test]
    fn test_set_line_quantity_missing_product() {
        let mut c = cart();
        assert!(matches!(
            c.set_line_quantity("ghost", 1, Utc::now()),
            Err(CoreError::ItemNotFound { .. })
        ));
    }

    #[test]
    fn test_remove_line() {
        let mut c = cart();
        c.add_line("p-1", "Gạo ST25 5kg", 150_000, 1, Utc::now()).unwrap();
        c.add_line("p-2", "Trứng gà (10)", 32_000, 1, Utc::now()).unwrap();

        c.remove_line("p-1", Utc::now()).unwrap();
        assert_eq!(c.items.len(), 1);
        assert_eq!(c.total_amount, 32_000);

        assert!(matches!(
            c.remove_line("p-1", Utc::now()),
            Err(CoreError::ItemNotFound { .. })
        ));
    }

    #[test]
    fn test_total_matches_fold_after_every_mutation() {
        let mut c = cart();
        c.add_line("p-1", "Gạo", 150_000, 1, Utc::now()).unwrap();
        c.add_line("p-2", "Trứng", 32_000, 4, Utc::now()).unwrap();
        c.set_line_quantity("p-2", 2, Utc::now()).unwrap();
        c.remove_line("p-1", Utc::now()).unwrap();

        let fold: i64 = c
            .items
            .iter()
            .map(|i| i.unit_price * i.quantity)
            .sum();
        assert_eq!(c.total_amount, fold);
        assert_eq!(c.total_amount, 64_000);
    }

    #[test]
    fn test_checkout_is_not_idempotent() {
        let mut c = cart();
        c.add_line("p-1", "Gạo", 150_000, 1, Utc::now()).unwrap();

        c.begin_checkout(Utc::now()).unwrap();
        assert_eq!(c.status, CartStatus::CheckedOut);

        // Second checkout must fail, not silently succeed
        assert!(matches!(
            c.begin_checkout(Utc::now()),
            Err(CoreError::CartNotActive { .. })
        ));
    }

    #[test]
    fn test_checked_out_cart_rejects_mutation() {
        let mut c = cart();
        c.add_line("p-1", "Gạo", 150_000, 1, Utc::now()).unwrap();
        c.begin_checkout(Utc::now()).unwrap();

        assert!(c.add_line("p-2", "Trứng", 32_000, 1, Utc::now()).is_err());
        assert!(c.set_line_quantity("p-1", 3, Utc::now()).is_err());
        assert!(c.remove_line("p-1", Utc::now()).is_err());
    }

    #[test]
    fn test_quantity_cap() {
        let mut c = cart();
        assert!(matches!(
            c.add_line("p-1", "Gạo", 150_000, MAX_ITEM_QUANTITY + 1, Utc::now()),
            Err(CoreError::QuantityTooLarge { .. })
        ));
    }

    #[test]
    fn test_status_defaults() {
        assert_eq!(CartStatus::default(), CartStatus::Active);
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
        assert_eq!(PaymentStatus::default(), PaymentStatus::Pending);
    }

    #[test]
    fn test_status_serde_forms() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Confirmed).unwrap(),
            "\"CONFIRMED\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Paid).unwrap(),
            "\"Paid\""
        );
        assert_eq!(
            serde_json::to_string(&CartStatus::CheckedOut).unwrap(),
            "\"checked_out\""
        );
    }
}
