//! # Discount Evaluation
//!
//! Pure eligibility and amount computation for promotional discounts.
//!
//! ## Eligibility Gates (applied in order)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  catalog discount                                                   │
//! │       │                                                             │
//! │       ├── 1. Walk-in gate ──── only BottleReturn passes for a       │
//! │       │                        walk-in customer                     │
//! │       ├── 2. Active + validity window (starts_at <= now <= ends_at) │
//! │       ├── 3. Product-type allowlist ── at least one matching line   │
//! │       ├── 4. Minimum purchase ──────── over MATCHING lines only     │
//! │       └── 5. Partial-payment gate ──── Pending requires the         │
//! │                                        allow_partial_payment flag   │
//! │       ▼                                                             │
//! │  eligible set                                                       │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything here is a deterministic function of
//! `{cart, customer, payment status, now}`, so evaluating twice on unchanged
//! inputs yields the same eligible set and the same amounts. Selection
//! state (which eligible discounts are actually applied) lives in the
//! order draft, not here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::Cart;
use crate::money::Money;
use crate::types::{Customer, PaymentStatus};

// =============================================================================
// Bottle Return Tiers
// =============================================================================

/// Fixed bottle-return tier table: bottles returned → credit in minor units.
///
/// Kept as a configuration table rather than inline conditionals so new
/// tiers can be added without touching the evaluation logic. Counts not in
/// the table credit zero.
pub const BOTTLE_RETURN_TIERS: &[(u32, i64)] = &[(1, 1000), (2, 2000), (3, 3000), (4, 4000)];

/// Looks up the bottle-return credit for a bottle count.
pub fn bottle_return_value(count: u32) -> Money {
    BOTTLE_RETURN_TIERS
        .iter()
        .find(|(tier, _)| *tier == count)
        .map(|(_, minor)| Money::from_minor(*minor))
        .unwrap_or_else(Money::zero)
}

// =============================================================================
// Discount
// =============================================================================

/// How a discount's value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    /// `value` is a whole percentage of the matching-lines subtotal.
    Percentage,
    /// `value` is a minor-unit amount, capped at the matching subtotal.
    FixedAmount,
    /// Credit from [`BOTTLE_RETURN_TIERS`] by `bottle_return_count`,
    /// capped at the matching subtotal.
    BottleReturn,
}

/// A promotional discount from the backend catalog, read-only.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Discount {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub kind: DiscountKind,

    /// Percentage (whole percent) or minor-unit amount, per `kind`.
    /// Unused for BottleReturn.
    pub value: i64,

    /// Bottles returned, for BottleReturn discounts.
    pub bottle_return_count: Option<u32>,

    /// Product-type allowlist. `None` means the discount applies to every
    /// line; otherwise only lines whose type tag is listed count towards
    /// eligibility and the discount amount.
    pub applicable_product_types: Option<Vec<String>>,

    /// Minimum matching-lines subtotal required, in minor units.
    pub min_purchase_minor: Option<i64>,

    pub is_active: bool,

    /// Validity window. Either bound may be open.
    #[ts(as = "Option<String>")]
    pub starts_at: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub ends_at: Option<DateTime<Utc>>,

    /// Automatically selected whenever it becomes eligible.
    #[serde(default)]
    pub auto_apply: bool,

    /// Whether the discount may combine with partial payment.
    #[serde(default)]
    pub allow_partial_payment: bool,
}

impl Discount {
    /// Whether the discount is active and inside its validity window.
    pub fn is_current(&self, now: DateTime<Utc>) -> bool {
        if !self.is_active {
            return false;
        }
        if let Some(start) = self.starts_at {
            if start > now {
                return false;
            }
        }
        if let Some(end) = self.ends_at {
            if end < now {
                return false;
            }
        }
        true
    }

    fn matches_product_type(&self, product_type: &str) -> bool {
        match &self.applicable_product_types {
            None => true,
            Some(types) => types.iter().any(|t| t == product_type),
        }
    }
}

// =============================================================================
// Evaluation Context
// =============================================================================

/// The draft state a discount is evaluated against.
#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'a> {
    pub cart: &'a Cart,
    pub customer: Option<&'a Customer>,
    /// `None` until the cashier picks a status; the partial-payment gate
    /// only fires for an explicit `Pending`.
    pub payment_status: Option<PaymentStatus>,
    pub now: DateTime<Utc>,
}

impl<'a> EvalContext<'a> {
    fn is_walk_in(&self) -> bool {
        self.customer.map(Customer::is_walk_in_customer).unwrap_or(false)
    }

    fn is_pending(&self) -> bool {
        matches!(self.payment_status, Some(PaymentStatus::Pending))
    }
}

// =============================================================================
// Evaluation
// =============================================================================

/// Subtotal of the cart lines a discount applies to.
///
/// Lines whose product type is in the allowlist, or every line when the
/// discount declares none. Both the minimum-purchase gate and the amount
/// computation run over this restricted subtotal.
pub fn matching_subtotal(cart: &Cart, discount: &Discount) -> Money {
    cart.items()
        .iter()
        .filter(|line| discount.matches_product_type(&line.product_type))
        .map(|line| line.line_total())
        .sum()
}

/// Applies the five eligibility gates in order.
pub fn is_eligible(discount: &Discount, ctx: &EvalContext<'_>) -> bool {
    // Gate 1: walk-in customers only qualify for bottle returns.
    if ctx.is_walk_in() && discount.kind != DiscountKind::BottleReturn {
        return false;
    }

    // Gate 2: active flag and validity window.
    if !discount.is_current(ctx.now) {
        return false;
    }

    // Gate 3: the allowlist must match at least one cart line.
    if discount.applicable_product_types.is_some() {
        let has_matching_line = ctx
            .cart
            .items()
            .iter()
            .any(|line| discount.matches_product_type(&line.product_type));
        if !has_matching_line {
            return false;
        }
    }

    // Gate 4: minimum purchase over the matching lines.
    if let Some(min) = discount.min_purchase_minor {
        if matching_subtotal(ctx.cart, discount).minor() < min {
            return false;
        }
    }

    // Gate 5: partial payment requires explicit opt-in.
    if ctx.is_pending() && !discount.allow_partial_payment {
        return false;
    }

    true
}

/// Filters the catalog down to the eligible set.
///
/// Pure and idempotent: no counters, no side effects. Auto-apply
/// notification bookkeeping belongs to the draft, not the evaluator.
pub fn eligible_discounts<'a>(catalog: &'a [Discount], ctx: &EvalContext<'_>) -> Vec<&'a Discount> {
    catalog.iter().filter(|d| is_eligible(d, ctx)).collect()
}

/// Amount a single selected discount contributes.
///
/// The minimum-purchase and validity-window conditions are re-verified
/// here: a discount can become stale between selection and checkout as the
/// cart changes. A stale discount contributes zero but stays selected
/// until the draft's rules clear it or the user removes it.
pub fn discount_amount(discount: &Discount, cart: &Cart, now: DateTime<Utc>) -> Money {
    if !discount.is_current(now) {
        return Money::zero();
    }

    let matching = matching_subtotal(cart, discount);
    if let Some(min) = discount.min_purchase_minor {
        if matching.minor() < min {
            return Money::zero();
        }
    }

    match discount.kind {
        DiscountKind::Percentage => matching.percentage_bps((discount.value * 100) as u32),
        DiscountKind::FixedAmount => Money::from_minor(discount.value).min(matching),
        DiscountKind::BottleReturn => {
            let credit = discount
                .bottle_return_count
                .map(bottle_return_value)
                .unwrap_or_else(Money::zero);
            credit.min(matching)
        }
    }
}

/// Sum over all selected discounts. No stacking cap beyond each
/// discount's own per-discount cap.
pub fn total_discount_amount<'a>(
    selected: impl IntoIterator<Item = &'a Discount>,
    cart: &Cart,
    now: DateTime<Utc>,
) -> Money {
    selected
        .into_iter()
        .map(|d| discount_amount(d, cart, now))
        .sum()
}

// =============================================================================
// Unit Tests
// =============================================================================
