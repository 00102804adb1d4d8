//! # Validation Module
//!
//! Input validation utilities for the storefront.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend (TypeScript)                                        │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: HTTP handler (Rust)                                          │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: request-field validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Domain + Database                                            │
//! │  ├── Cart/order business rules (types.rs)                              │
//! │  └── NOT NULL / UNIQUE / FK constraints                                │
//! │                                                                         │
//! │  Defense in depth: multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::MAX_ITEM_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates an entity id field (user, cart, product, order).
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must be at most 64 characters (UUIDs are 36)
pub fn validate_id(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.len() > 64 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 64,
        });
    }

    Ok(())
}

/// Validates an item quantity.
///
/// ## Rules
/// - Must be positive (a non-positive quantity is never "treat as remove")
/// - Must not exceed the per-item cap
///
/// ## Example
/// ```rust
/// use sevmart_core::validation::validate_quantity;
///
/// assert!(validate_quantity(5).is_ok());
/// assert!(validate_quantity(0).is_err());
/// assert!(validate_quantity(-2).is_err());
/// ```
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if quantity > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a unit price snapshot.
///
/// Zero is allowed (free samples, vouchers); negative prices are not.
pub fn validate_unit_price(price: i64) -> ValidationResult<()> {
    if price < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "unitPrice".to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_id() {
        assert!(validate_id("userId", "user-1").is_ok());
        assert!(validate_id("userId", "  ").is_err());
        assert!(validate_id("userId", &"x".repeat(65)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_ITEM_QUANTITY).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(MAX_ITEM_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_unit_price() {
        assert!(validate_unit_price(0).is_ok());
        assert!(validate_unit_price(150_000).is_ok());
        assert!(validate_unit_price(-1).is_err());
    }
}
