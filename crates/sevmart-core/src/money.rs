//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely, plus the
//! ledger functions every cart and order total flows through.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer đồng                                             │
//! │    The Vietnamese đồng has no fractional unit, so the smallest          │
//! │    currency unit IS the đồng. All amounts are plain i64 đồng.           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why Recompute Instead Of Increment?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  totalPrice += delta  scattered across add/update/remove handlers       │
//! │  drifts the moment two writers interleave or one write half-fails.      │
//! │                                                                         │
//! │  Here the aggregate is ONLY ever produced by cart_total(), a pure       │
//! │  fold over the line items, recomputed after every mutation.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use sevmart_core::money::{line_total, Money};
//!
//! let price = Money::from_vnd(15_000); // 15.000₫
//! let total = line_total(price, 3).unwrap();
//! assert_eq!(total.vnd(), 45_000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::types::CartLineItem;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in Vietnamese đồng.
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for refunds, adjustments
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from đồng.
    ///
    /// ## Example
    /// ```rust
    /// use sevmart_core::money::Money;
    ///
    /// let price = Money::from_vnd(150_000);
    /// assert_eq!(price.vnd(), 150_000);
    /// ```
    #[inline]
    pub const fn from_vnd(amount: i64) -> Self {
        Money(amount)
    }

    /// Returns the value in đồng.
    #[inline]
    pub const fn vnd(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use sevmart_core::money::Money;
    ///
    /// let unit_price = Money::from_vnd(12_500);
    /// let total = unit_price.multiply_quantity(4);
    /// assert_eq!(total.vnd(), 50_000);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Ledger Functions
// =============================================================================

/// Computes a line total (`unit_price * quantity`) with input validation.
///
/// ## Errors
/// - [`CoreError::InvalidQuantity`] if `quantity <= 0`
/// - [`CoreError::InvalidPrice`] if `unit_price` is negative
///
/// ## Example
/// ```rust
/// use sevmart_core::money::{line_total, Money};
///
/// assert_eq!(line_total(Money::from_vnd(8_000), 2).unwrap().vnd(), 16_000);
/// assert!(line_total(Money::from_vnd(8_000), 0).is_err());
/// assert!(line_total(Money::from_vnd(-1), 1).is_err());
/// ```
pub fn line_total(unit_price: Money, quantity: i64) -> CoreResult<Money> {
    if quantity <= 0 {
        return Err(CoreError::InvalidQuantity { quantity });
    }
    if unit_price.is_negative() {
        return Err(CoreError::InvalidPrice {
            price: unit_price.vnd(),
        });
    }
    Ok(unit_price.multiply_quantity(quantity))
}

/// Recomputes a cart's aggregate total as a pure fold over its line items.
///
/// This is the authoritative path for cart totals: every mutation recomputes
/// the aggregate from the line-item list. The total is never maintained as
/// independently-updated state.
///
/// ## Example
/// ```rust
/// use sevmart_core::money::{cart_total, Money};
/// use sevmart_core::types::CartLineItem;
/// use chrono::Utc;
///
/// let items = vec![
///     CartLineItem::new("p-1", "Gạo ST25 5kg", 150_000, 1, Utc::now()),
///     CartLineItem::new("p-2", "Nước mắm 500ml", 45_000, 2, Utc::now()),
/// ];
/// assert_eq!(cart_total(&items).unwrap().vnd(), 240_000);
/// ```
pub fn cart_total(items: &[CartLineItem]) -> CoreResult<Money> {
    let mut total = Money::zero();
    for item in items {
        total += line_total(item.unit_price(), item.quantity)?;
    }
    Ok(total)
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in the Vietnamese convention
/// (dot-grouped digits with a trailing ₫).
///
/// ## Note
/// This is for logs and debugging. The frontend formats amounts itself.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let digits = self.0.abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(c);
        }
        write!(f, "{}{}₫", sign, grouped)
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_from_vnd() {
        let money = Money::from_vnd(150_000);
        assert_eq!(money.vnd(), 150_000);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_vnd(150_000)), "150.000₫");
        assert_eq!(format!("{}", Money::from_vnd(1_250)), "1.250₫");
        assert_eq!(format!("{}", Money::from_vnd(999)), "999₫");
        assert_eq!(format!("{}", Money::from_vnd(-45_000)), "-45.000₫");
        assert_eq!(format!("{}", Money::from_vnd(0)), "0₫");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_vnd(10_000);
        let b = Money::from_vnd(4_500);

        assert_eq!((a + b).vnd(), 14_500);
        assert_eq!((a - b).vnd(), 5_500);
        assert_eq!(a.multiply_quantity(3).vnd(), 30_000);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let positive = Money::from_vnd(100);
        assert!(positive.is_positive());

        let negative = Money::from_vnd(-100);
        assert!(negative.is_negative());
    }

    #[test]
    fn test_line_total_valid() {
        let total = line_total(Money::from_vnd(12_000), 5).unwrap();
        assert_eq!(total.vnd(), 60_000);
    }

    #[test]
    fn test_line_total_rejects_non_positive_quantity() {
        assert!(matches!(
            line_total(Money::from_vnd(12_000), 0),
            Err(CoreError::InvalidQuantity { quantity: 0 })
        ));
        assert!(matches!(
            line_total(Money::from_vnd(12_000), -3),
            Err(CoreError::InvalidQuantity { quantity: -3 })
        ));
    }

    #[test]
    fn test_line_total_rejects_negative_price() {
        assert!(matches!(
            line_total(Money::from_vnd(-1), 1),
            Err(CoreError::InvalidPrice { price: -1 })
        ));
    }

    #[test]
    fn test_cart_total_folds_all_lines() {
        let now = Utc::now();
        let items = vec![
            CartLineItem::new("p-1", "Gạo ST25 5kg", 150_000, 1, now),
            CartLineItem::new("p-2", "Nước mắm 500ml", 45_000, 2, now),
            CartLineItem::new("p-3", "Rau muống", 8_000, 3, now),
        ];
        assert_eq!(cart_total(&items).unwrap().vnd(), 264_000);
    }

    #[test]
    fn test_cart_total_empty_is_zero() {
        assert_eq!(cart_total(&[]).unwrap().vnd(), 0);
    }

    #[test]
    fn test_cart_total_propagates_bad_line() {
        let now = Utc::now();
        let items = vec![CartLineItem::new("p-1", "Gạo ST25 5kg", 150_000, 0, now)];
        assert!(cart_total(&items).is_err());
    }
}
