//! # sevmart-core: Pure Business Logic for the Sevmart Storefront
//!
//! This crate is the **heart** of the Sevmart grocery storefront. It contains
//! all business logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sevmart Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Frontend (single-page app)                      │   │
//! │  │    Catalog ──► Cart ──► Checkout ──► QR Payment ──► Orders     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP/JSON                             │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 apps/storefront-api (axum)                      │   │
//! │  │    cart routes, checkout, payment webhook, order status        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ sevmart-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  payment  │  │ validation│  │   │
//! │  │   │   Cart    │  │   Money   │  │ QR codes  │  │   rules   │  │   │
//! │  │   │   Order   │  │  ledger   │  │ reconcile │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  sevmart-db (Database Layer)                    │   │
//! │  │          SQLite queries, migrations, repositories               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Cart, Order, Product, statuses)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`payment`] - Payment codes, QR requests, webhook memo extraction,
//!   reconciliation decisions
//! - [`error`] - Domain error types
//! - [`validation`] - Request-field validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here;
//!    even timestamps are passed in by callers
//! 3. **Integer Money**: All monetary values are in đồng (i64), never floats
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use sevmart_core::payment::{extract_payment_code, payment_code_for};
//!
//! // Derive the public code an order's QR carries
//! let code = payment_code_for("0f3c9e1a-77aa-4c2e-9d41-6b20e1ab12cd", 6);
//! assert_eq!(code, "SEVQRAB12CD");
//!
//! // Later, find that code again in a bank-transfer memo
//! let memo = "CK tu NGUYEN VAN A SEVQRAB12CD thanh toan don hang";
//! assert_eq!(extract_payment_code(memo), Some(code));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod payment;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use sevmart_core::Money` instead of
// `use sevmart_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single cart
///
/// ## Business Reason
/// Prevents runaway carts and keeps order documents a sane size.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line in a cart
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;
