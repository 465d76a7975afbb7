//! # Pricing Calculator
//!
//! Derives the order totals from the cart subtotal, the discount amount,
//! and the payment status.
//!
//! ## The Formula
//! ```text
//! subtotal   = Σ line totals
//! tax        = subtotal × 18%          (informational only, see below)
//! total      = subtotal − discount     (tax NOT included, by business rule)
//!
//! Complete:  amount_due = total,       remaining = 0
//! Pending:   amount_due = total × 0.5, remaining = total − amount_due
//! ```
//!
//! Tax is computed for display and reporting but never added to the payable
//! total. The 18% rate is fixed; it rides along on every order payload so
//! the back office can reconcile.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::Cart;
use crate::money::{Money, TaxRate};
use crate::types::PaymentStatus;

/// Fixed informational tax rate: 18%.
pub const TAX_RATE: TaxRate = TaxRate::from_bps(1800);

/// Derived monetary summary of an order draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub subtotal: Money,
    /// Informational tax at 18% of the subtotal. Not payable.
    pub tax: Money,
    pub discount: Money,
    /// Payable total: subtotal − discount.
    pub total: Money,
    /// Due at checkout: the full total, or half of it for partial payment.
    pub amount_due: Money,
    /// Outstanding balance after checkout.
    pub remaining: Money,
}

/// Computes the totals for a subtotal/discount/payment-status triple.
///
/// Defaults to the full-payment split when no status is selected yet,
/// the submit-time validator requires an explicit status before anything
/// is sent to the backend.
pub fn compute_totals(
    subtotal: Money,
    discount: Money,
    payment_status: Option<PaymentStatus>,
) -> Totals {
    let tax = subtotal.tax(TAX_RATE);
    let total = subtotal - discount;

    let (amount_due, remaining) = match payment_status {
        Some(PaymentStatus::Pending) => total.half_split(),
        _ => (total, Money::zero()),
    };

    Totals {
        subtotal,
        tax,
        discount,
        total,
        amount_due,
        remaining,
    }
}

/// Convenience wrapper computing totals straight from a cart.
pub fn totals_for_cart(
    cart: &Cart,
    discount: Money,
    payment_status: Option<PaymentStatus>,
) -> Totals {
    compute_totals(cart.subtotal(), discount, payment_status)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_order_no_discount() {
        // price 1000 × qty 2, complete payment.
        let totals = compute_totals(
            Money::from_minor(2000),
            Money::zero(),
            Some(PaymentStatus::Complete),
        );

        assert_eq!(totals.subtotal.minor(), 2000);
        assert_eq!(totals.tax.minor(), 360);
        assert_eq!(totals.discount.minor(), 0);
        assert_eq!(totals.total.minor(), 2000);
        assert_eq!(totals.amount_due.minor(), 2000);
        assert_eq!(totals.remaining.minor(), 0);
    }

    #[test]
    fn test_discount_reduces_total_not_tax() {
        // Subtotal 5000 with a 500 discount: tax stays on the subtotal.
        let totals = compute_totals(
            Money::from_minor(5000),
            Money::from_minor(500),
            Some(PaymentStatus::Complete),
        );

        assert_eq!(totals.total.minor(), 4500);
        assert_eq!(totals.tax.minor(), 900);
    }

    #[test]
    fn test_partial_payment_split() {
        let totals = compute_totals(
            Money::from_minor(3000),
            Money::zero(),
            Some(PaymentStatus::Pending),
        );

        assert_eq!(totals.amount_due.minor(), 1500);
        assert_eq!(totals.remaining.minor(), 1500);
        assert_eq!(totals.amount_due + totals.remaining, totals.total);
    }

    #[test]
    fn test_partial_payment_odd_total_reconstructs() {
        let totals = compute_totals(
            Money::from_minor(1001),
            Money::zero(),
            Some(PaymentStatus::Pending),
        );

        assert_eq!(totals.amount_due + totals.remaining, totals.total);
        assert_eq!(totals.amount_due.minor(), 501);
    }

    #[test]
    fn test_no_status_behaves_as_full_payment() {
        let totals = compute_totals(Money::from_minor(2000), Money::zero(), None);
        assert_eq!(totals.amount_due.minor(), 2000);
        assert_eq!(totals.remaining.minor(), 0);
    }

    #[test]
    fn test_total_formula_property() {
        for (subtotal, discount) in [(10000, 0), (10000, 2500), (777, 77), (0, 0)] {
            let totals = compute_totals(
                Money::from_minor(subtotal),
                Money::from_minor(discount),
                Some(PaymentStatus::Pending),
            );
            assert_eq!(totals.total, totals.subtotal - totals.discount);
            assert_eq!(totals.tax, totals.subtotal.percentage_bps(1800));
            assert_eq!(totals.amount_due + totals.remaining, totals.total);
        }
    }
}
