//! # Pricing Engine
//!
//! Pure functions computing line subtotals and invoice grand totals.
//!
//! ## The Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Pricing Engine                                     │
//! │                                                                         │
//! │  line_subtotal(price, qty, discount, rate)                             │
//! │      = (price × qty − discount) × (1 + rate/100)                       │
//! │                                                                         │
//! │  invoice_total(items) = Σ line_subtotal(item)                          │
//! │                                                                         │
//! │  Called identically at BOTH ends:                                      │
//! │                                                                         │
//! │  Item-entry UI ──► line_subtotal ──► live display                      │
//! │                                                                         │
//! │  API create/update ──► line_subtotal ──► persisted subtotal            │
//! │                            │                                            │
//! │                            ▼                                            │
//! │  Client-submitted totals are NEVER trusted: the store recomputes       │
//! │  and overwrites them before commit.                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Numeric Semantics
//! All math is exact integer paise. Price and discount are rounded to 2
//! decimal places when they enter the system (`Money::from_rupees`); GST is
//! rounded half-away-from-zero at 1 paisa precision. A discount exceeding
//! `price × qty` legitimately produces a negative subtotal - no clamping.

use crate::money::Money;
use crate::types::{GstRate, LineItemInput};

/// Computes the subtotal for one line item.
///
/// `subtotal = (price * quantity - discount) + gst(base)`
///
/// ## Example
/// ```rust
/// use invoice_core::money::Money;
/// use invoice_core::pricing::line_subtotal;
/// use invoice_core::types::GstRate;
///
/// // price 100.00, qty 2, discount 20.00, GST 18%
/// // base = 200.00 - 20.00 = 180.00; gst = 32.40; subtotal = 212.40
/// let subtotal = line_subtotal(
///     Money::from_paise(10000),
///     2,
///     Money::from_paise(2000),
///     GstRate::Eighteen,
/// );
/// assert_eq!(subtotal.paise(), 21240);
/// ```
pub fn line_subtotal(price: Money, quantity: i64, discount: Money, rate: GstRate) -> Money {
    let base = price * quantity - discount;
    base + base.gst(rate)
}

/// Computes the subtotal for a client-supplied line item.
#[inline]
pub fn compute_line(item: &LineItemInput) -> Money {
    line_subtotal(item.price, item.quantity, item.discount, item.gst_rate)
}

/// Computes the invoice grand total: the exact sum of all line subtotals.
pub fn invoice_total(items: &[LineItemInput]) -> Money {
    items.iter().map(compute_line).sum()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(price: i64, qty: i64, discount: i64, rate: GstRate) -> LineItemInput {
        LineItemInput {
            item_name: "Item".to_string(),
            price: Money::from_paise(price),
            quantity: qty,
            discount: Money::from_paise(discount),
            gst_rate: rate,
        }
    }

    #[test]
    fn test_reference_example() {
        // price 100, qty 2, discount 20, GST 18 → (200-20)*1.18 = 212.40
        let subtotal = line_subtotal(
            Money::from_paise(10000),
            2,
            Money::from_paise(2000),
            GstRate::Eighteen,
        );
        assert_eq!(subtotal.paise(), 21240);
    }

    #[test]
    fn test_zero_rate_is_base_amount() {
        let subtotal = line_subtotal(
            Money::from_paise(9999),
            3,
            Money::from_paise(500),
            GstRate::Zero,
        );
        assert_eq!(subtotal.paise(), 9999 * 3 - 500);
    }

    #[test]
    fn test_zero_quantity() {
        // qty 0 with a discount: base is -discount, GST applies to it
        let subtotal = line_subtotal(
            Money::from_paise(10000),
            0,
            Money::from_paise(0),
            GstRate::Eighteen,
        );
        assert_eq!(subtotal.paise(), 0);
    }

    #[test]
    fn test_discount_exceeding_base_goes_negative() {
        // base = 100*1 - 500 = -400; 18% of -400 = -72; subtotal = -472
        let subtotal = line_subtotal(
            Money::from_paise(100),
            1,
            Money::from_paise(500),
            GstRate::Eighteen,
        );
        assert_eq!(subtotal.paise(), -472);
        assert!(subtotal.is_negative());
    }

    #[test]
    fn test_all_slabs() {
        // base = 100.00 for easy percentages
        let expect = [10000, 10500, 11200, 11800, 12800];
        for (rate, want) in GstRate::ALL.iter().zip(expect) {
            let got = line_subtotal(Money::from_paise(10000), 1, Money::zero(), *rate);
            assert_eq!(got.paise(), want, "slab {}%", rate.percent());
        }
    }

    #[test]
    fn test_invoice_total_is_exact_sum() {
        let items = vec![
            item(10000, 2, 2000, GstRate::Eighteen), // 21240
            item(550, 3, 0, GstRate::Five),          // 1650 + 83 (82.5 rounded up) = 1733
            item(100, 1, 500, GstRate::Eighteen),    // -472
        ];
        let per_line: i64 = items.iter().map(|i| compute_line(i).paise()).sum();
        assert_eq!(invoice_total(&items).paise(), per_line);
        assert_eq!(invoice_total(&items).paise(), 21240 + 1733 - 472);
    }

    #[test]
    fn test_totals_stay_exact_at_the_amount_cap() {
        // The validated domain tops out at MAX_AMOUNT_PAISE price, quantity
        // 999, 28% GST, 100 items - all of it must fit in i64
        let items: Vec<LineItemInput> = (0..crate::MAX_INVOICE_ITEMS)
            .map(|_| {
                item(
                    crate::MAX_AMOUNT_PAISE,
                    crate::MAX_ITEM_QUANTITY,
                    0,
                    GstRate::TwentyEight,
                )
            })
            .collect();

        let per_line = compute_line(&items[0]).paise();
        assert_eq!(per_line, crate::MAX_AMOUNT_PAISE * 999 * 128 / 100);
        assert_eq!(
            invoice_total(&items).paise(),
            per_line * crate::MAX_INVOICE_ITEMS as i64
        );
    }

    #[test]
    fn test_empty_item_list_totals_zero() {
        assert_eq!(invoice_total(&[]).paise(), 0);
    }

    #[test]
    fn test_no_float_accumulation_drift() {
        // 0.10 a thousand times is exactly 100.00 in integer paise
        let items: Vec<LineItemInput> =
            (0..1000).map(|_| item(10, 1, 0, GstRate::Zero)).collect();
        assert_eq!(invoice_total(&items).paise(), 10000);
    }
}
