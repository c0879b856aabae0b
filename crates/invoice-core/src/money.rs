//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Summing dozens of line subtotals in f64 accumulates that error        │
//! │  until the stored grand total no longer equals the sum of its items.   │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Paise                                            │
//! │    ₹212.40 = 21240 paise. All arithmetic is exact integer math;        │
//! │    decimals exist only at the JSON boundary.                           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use crate::types::GstRate;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in paise (the smallest currency unit).
///
/// ## Design Decisions
/// - **i64 (signed)**: A discount larger than `price * quantity` produces a
///   legitimately negative line subtotal, so the type must carry sign.
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paise (the smallest currency unit).
    #[inline]
    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    /// Creates a Money value from a decimal rupee amount.
    ///
    /// This is the ONLY place a float enters monetary math: the JSON boundary.
    /// The amount is rounded half-away-from-zero to 2 decimal places here,
    /// and everything downstream is exact integer arithmetic.
    ///
    /// ## Example
    /// ```rust
    /// use invoice_core::money::Money;
    ///
    /// assert_eq!(Money::from_rupees(10.99).paise(), 1099);
    /// assert_eq!(Money::from_rupees(0.005).paise(), 1);
    /// ```
    #[inline]
    pub fn from_rupees(rupees: f64) -> Self {
        Money((rupees * 100.0).round() as i64)
    }

    /// Returns the value in paise.
    #[inline]
    pub const fn paise(&self) -> i64 {
        self.0
    }

    /// Returns the value as a decimal rupee amount (for the JSON boundary only).
    #[inline]
    pub fn rupees(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns the major unit (rupees) portion.
    #[inline]
    pub const fn whole_rupees(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (paise) portion (always 0-99).
    #[inline]
    pub const fn paise_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Calculates GST on this amount at the given rate.
    ///
    /// ## Implementation
    /// Integer math in basis points with rounding at 1 paisa precision:
    /// `(amount * bps + 5000) / 10000`. Uses i128 to prevent overflow on
    /// large amounts.
    ///
    /// ## Example
    /// ```rust
    /// use invoice_core::money::Money;
    /// use invoice_core::types::GstRate;
    ///
    /// let base = Money::from_paise(18000); // ₹180.00
    /// let gst = base.gst(GstRate::Eighteen);
    /// assert_eq!(gst.paise(), 3240); // ₹32.40
    /// ```
    pub fn gst(&self, rate: GstRate) -> Money {
        let num = self.0 as i128 * rate.bps() as i128;
        // Round half away from zero so negative bases mirror positive ones
        let gst_paise = if num >= 0 {
            (num + 5000) / 10000
        } else {
            (num - 5000) / 10000
        };
        Money::from_paise(gst_paise as i64)
    }

    /// Multiplies money by a quantity.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for logs and debugging. The frontend formats its own currency.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}₹{}.{:02}",
            sign,
            self.whole_rupees().abs(),
            self.paise_part()
        )
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by i64 (for quantity calculations).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

/// Exact summation of line subtotals into an invoice total.
impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_paise() {
        let money = Money::from_paise(1099);
        assert_eq!(money.paise(), 1099);
        assert_eq!(money.whole_rupees(), 10);
        assert_eq!(money.paise_part(), 99);
    }

    #[test]
    fn test_from_rupees_rounds_to_two_decimals() {
        assert_eq!(Money::from_rupees(10.99).paise(), 1099);
        assert_eq!(Money::from_rupees(100.0).paise(), 10000);
        assert_eq!(Money::from_rupees(0.005).paise(), 1);
        assert_eq!(Money::from_rupees(-5.50).paise(), -550);
        // Classic float artifact: 0.1 + 0.2
        assert_eq!(Money::from_rupees(0.1 + 0.2).paise(), 30);
    }

    #[test]
    fn test_rupees_round_trip() {
        let money = Money::from_paise(21240);
        assert!((money.rupees() - 212.40).abs() < f64::EPSILON);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_paise(1099)), "₹10.99");
        assert_eq!(format!("{}", Money::from_paise(500)), "₹5.00");
        assert_eq!(format!("{}", Money::from_paise(-550)), "-₹5.50");
        assert_eq!(format!("{}", Money::from_paise(0)), "₹0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_paise(1000);
        let b = Money::from_paise(500);

        assert_eq!((a + b).paise(), 1500);
        assert_eq!((a - b).paise(), 500);
        assert_eq!((a * 3).paise(), 3000);
    }

    #[test]
    fn test_gst_basic() {
        // ₹180.00 at 18% = ₹32.40
        let base = Money::from_paise(18000);
        assert_eq!(base.gst(GstRate::Eighteen).paise(), 3240);
    }

    #[test]
    fn test_gst_with_rounding() {
        // ₹0.99 at 5% = ₹0.0495 → rounds to ₹0.05
        let base = Money::from_paise(99);
        assert_eq!(base.gst(GstRate::Five).paise(), 5);
    }

    #[test]
    fn test_gst_on_negative_base() {
        // Negative bases (discount > price*qty) get negative GST
        let base = Money::from_paise(-10000);
        assert_eq!(base.gst(GstRate::Eighteen).paise(), -1800);
    }

    #[test]
    fn test_sum() {
        let total: Money = [100, 200, 300]
            .iter()
            .map(|p| Money::from_paise(*p))
            .sum();
        assert_eq!(total.paise(), 600);
    }
}
