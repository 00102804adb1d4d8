//! # Error Types
//!
//! Domain-specific error types for sevmart-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  sevmart-core errors (this file)                                       │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  sevmart-db errors (separate crate)                                    │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  storefront-api errors (in app)                                        │
//! │  └── ApiError         - What HTTP clients see (serialized)             │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Client       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product id, cart id, etc.)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They should be caught and translated to user-friendly messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Quantity is zero or negative.
    ///
    /// ## When This Occurs
    /// - `add_item` called with quantity <= 0
    /// - `update_item` called with quantity <= 0 (an absolute update to a
    ///   non-positive quantity is rejected, never treated as removal)
    #[error("Invalid quantity: {quantity} (must be positive)")]
    InvalidQuantity { quantity: i64 },

    /// Unit price is negative.
    ///
    /// Catalog prices are snapshotted into cart lines at add time; a negative
    /// snapshot would corrupt every total derived from it.
    #[error("Invalid unit price: {price} (must not be negative)")]
    InvalidPrice { price: i64 },

    /// Order amount is not payable.
    ///
    /// ## When This Occurs
    /// - Generating a payment request for an order whose total is <= 0
    #[error("Invalid payment amount: {amount} (must be positive)")]
    InvalidAmount { amount: i64 },

    /// The referenced product has no line in the cart.
    #[error("Item not found in cart: {product_id}")]
    ItemNotFound { product_id: String },

    /// Cart is not in the `active` state required for the operation.
    ///
    /// ## When This Occurs
    /// - `checkout` on an already checked-out cart (double checkout would
    ///   create a second order for the same purchase)
    /// - Mutating a cart that was checked out or abandoned
    #[error("Cart {cart_id} is {current_status}, operation requires an active cart")]
    CartNotActive {
        cart_id: String,
        current_status: String,
    },

    /// Cart has exceeded maximum allowed items.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Item quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// Invalid format (e.g., invalid UUID, invalid code).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InvalidQuantity { quantity: -2 };
        assert_eq!(err.to_string(), "Invalid quantity: -2 (must be positive)");

        let err = CoreError::CartNotActive {
            cart_id: "c-1".to_string(),
            current_status: "checked_out".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Cart c-1 is checked_out, operation requires an active cart"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "productId".to_string(),
        };
        assert_eq!(err.to_string(), "productId is required");

        let err = ValidationError::MustBeNonNegative {
            field: "unitPrice".to_string(),
        };
        assert_eq!(err.to_string(), "unitPrice must not be negative");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
