//! # Order Draft
//!
//! The mutable state behind one order-entry form: cart, customer selection,
//! payment fields, notes, and the selected discount set, plus the derived
//! values (eligible discounts, discount amount, totals).
//!
//! ## Reactive Recomputation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  mutation (add line, pick customer, flip payment status, ...)       │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  dirty = true                                                       │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  recompute(catalog, now)  ← called before any derived read          │
//! │       ├── rebuild eligible set (pure, amber-core)                   │
//! │       ├── auto-apply flagged discounts (notify once each)           │
//! │       ├── discount amount over the selected set                     │
//! │       └── totals (subtotal / tax / total / split)                   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The dirty flag replaces a UI framework's effect scheduler: running
//! `recompute` twice on unchanged inputs is a no-op, and the evaluation
//! itself has no hidden state beyond the once-per-discount auto-apply
//! notification bookkeeping.
//!
//! ## Selection Rules
//! - at most one bottle-return discount selected at a time
//! - a walk-in customer clears every non-bottle-return selection
//! - flipping payment status to Pending clears the whole selection and
//!   marks the discount catalog for refetch (some discounts are
//!   status-scoped on the backend)

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};
use ts_rs::TS;

use amber_core::{
    discount, totals_for_cart, Cart, CoreError, CoreResult, Customer, Discount, DiscountKind,
    EvalContext, Money, PaymentMethod, PaymentStatus, Product, QuantityChange, Role, Totals,
};

// =============================================================================
// Notices
// =============================================================================

/// User-facing notifications produced by draft rules.
///
/// The shell drains these after each mutation/recompute and renders them
/// as toasts. They are notifications, not errors: the draft already
/// handled the condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum DraftNotice {
    /// An auto-apply discount became eligible and was selected.
    AutoApplied { discount_name: String },
    /// A quantity edit exceeded availability and was clamped.
    QuantityClamped {
        product_name: String,
        requested: i64,
        quantity: i64,
    },
    /// Selections were cleared because the customer became a walk-in.
    ClearedForWalkIn { discount_names: Vec<String> },
    /// Selections were cleared because payment flipped to pending.
    ClearedForPendingPayment,
}

// =============================================================================
// Order Draft
// =============================================================================

#[derive(Debug, Default)]
struct Derived {
    eligible_ids: Vec<String>,
    discount_amount: Money,
    totals: Totals,
}

/// One order draft. Independent of every other draft; created empty when
/// the form opens and reset only after a successful submission.
#[derive(Debug, Default)]
pub struct OrderDraft {
    cart: Cart,
    customer: Option<Customer>,
    payment_method: Option<PaymentMethod>,
    payment_status: Option<PaymentStatus>,
    notes: String,
    selected: Vec<String>,

    /// Discounts that already fired their auto-apply notification.
    /// Doubles as a "don't re-apply what the cashier removed" guard.
    auto_applied: HashSet<String>,

    dirty: bool,
    derived: Derived,
    notices: Vec<DraftNotice>,

    /// Set when the discount catalog must be refetched (payment-status
    /// scoped discounts). Consumed by [`Self::take_discount_refetch`].
    discount_refetch_needed: bool,
}

impl OrderDraft {
    pub fn new() -> Self {
        OrderDraft {
            dirty: true,
            ..Default::default()
        }
    }

    // -------------------------------------------------------------------------
    // Cart mutations
    // -------------------------------------------------------------------------

    /// Adds a product to the cart (see [`Cart::add_item`]).
    pub fn add_item(&mut self, product: &Product, role: Role, via_barcode: bool) -> CoreResult<()> {
        self.cart.add_item(product, role, via_barcode)?;
        debug!(product = %product.name, via_barcode, "line added");
        self.dirty = true;
        Ok(())
    }

    /// Sets a line quantity, reporting clamps as notices.
    pub fn set_quantity(&mut self, product_id: &str, quantity: i64) -> CoreResult<QuantityChange> {
        let change = self.cart.set_quantity(product_id, quantity)?;
        if let QuantityChange::Clamped {
            requested,
            quantity: clamped,
        } = change
        {
            let name = self
                .cart
                .items()
                .iter()
                .find(|l| l.product_id == product_id)
                .map(|l| l.name.clone())
                .unwrap_or_default();
            warn!(product = %name, requested, clamped, "quantity clamped to available stock");
            self.notices.push(DraftNotice::QuantityClamped {
                product_name: name,
                requested,
                quantity: clamped,
            });
        }
        self.dirty = true;
        Ok(change)
    }

    /// Removes a line.
    pub fn remove_item(&mut self, product_id: &str) -> CoreResult<()> {
        self.cart.remove_item(product_id)?;
        self.dirty = true;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Customer / payment mutations
    // -------------------------------------------------------------------------

    /// Selects (or clears) the customer.
    ///
    /// Switching to a walk-in customer deselects every non-bottle-return
    /// discount: walk-ins only qualify for bottle returns.
    pub fn set_customer(&mut self, customer: Option<Customer>, catalog: &[Discount]) {
        let becoming_walk_in = customer.as_ref().map(Customer::is_walk_in_customer).unwrap_or(false);
        self.customer = customer;

        if becoming_walk_in {
            let mut dropped = Vec::new();
            self.selected.retain(|id| {
                let keep = catalog
                    .iter()
                    .find(|d| &d.id == id)
                    .map(|d| d.kind == DiscountKind::BottleReturn)
                    .unwrap_or(false);
                if !keep {
                    if let Some(d) = catalog.iter().find(|d| &d.id == id) {
                        dropped.push(d.name.clone());
                    }
                }
                keep
            });
            if !dropped.is_empty() {
                self.notices.push(DraftNotice::ClearedForWalkIn {
                    discount_names: dropped,
                });
            }
        }
        self.dirty = true;
    }

    pub fn set_payment_method(&mut self, method: PaymentMethod) {
        self.payment_method = Some(method);
        self.dirty = true;
    }

    /// Sets the payment status.
    ///
    /// The transition to Pending clears every selected discount, since
    /// partial-payment eligibility must be re-established from scratch,
    /// and flags the discount catalog for a status-scoped refetch.
    pub fn set_payment_status(&mut self, status: PaymentStatus) {
        let was = self.payment_status;
        self.payment_status = Some(status);

        if status == PaymentStatus::Pending && was != Some(PaymentStatus::Pending) {
            if !self.selected.is_empty() {
                self.selected.clear();
                self.notices.push(DraftNotice::ClearedForPendingPayment);
            }
            self.discount_refetch_needed = true;
        }
        self.dirty = true;
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    // -------------------------------------------------------------------------
    // Discount selection
    // -------------------------------------------------------------------------

    /// Toggles a discount in the selected set.
    ///
    /// Selecting requires membership in the current eligible set; a second
    /// bottle-return selection is rejected with no state change.
    pub fn toggle_discount(
        &mut self,
        discount_id: &str,
        catalog: &[Discount],
        now: DateTime<Utc>,
    ) -> CoreResult<()> {
        if let Some(pos) = self.selected.iter().position(|id| id == discount_id) {
            self.selected.remove(pos);
            self.dirty = true;
            return Ok(());
        }

        self.recompute(catalog, now);

        // Recompute may have auto-applied this very discount; selecting it
        // is then already done.
        if self.selected.iter().any(|id| id == discount_id) {
            return Ok(());
        }

        let discount = catalog.iter().find(|d| d.id == discount_id).ok_or_else(|| {
            CoreError::DiscountNotEligible {
                name: discount_id.to_string(),
            }
        })?;

        if !self.derived.eligible_ids.iter().any(|id| id == discount_id) {
            return Err(CoreError::DiscountNotEligible {
                name: discount.name.clone(),
            });
        }

        if discount.kind == DiscountKind::BottleReturn && self.has_bottle_return(catalog) {
            return Err(CoreError::BottleReturnConflict);
        }

        self.selected.push(discount_id.to_string());
        self.dirty = true;
        Ok(())
    }

    fn has_bottle_return(&self, catalog: &[Discount]) -> bool {
        self.selected.iter().any(|id| {
            catalog
                .iter()
                .find(|d| &d.id == id)
                .map(|d| d.kind == DiscountKind::BottleReturn)
                .unwrap_or(false)
        })
    }

    // -------------------------------------------------------------------------
    // Recompute
    // -------------------------------------------------------------------------

    /// Rebuilds all derived state. Must be called before any derived read;
    /// a no-op when nothing changed since the last run.
    pub fn recompute(&mut self, catalog: &[Discount], now: DateTime<Utc>) {
        if !self.dirty {
            return;
        }

        let ctx = EvalContext {
            cart: &self.cart,
            customer: self.customer.as_ref(),
            payment_status: self.payment_status,
            now,
        };
        let eligible = discount::eligible_discounts(catalog, &ctx);
        self.derived.eligible_ids = eligible.iter().map(|d| d.id.clone()).collect();

        // Auto-apply: eligible, flagged, not yet selected, and not already
        // auto-applied earlier in this draft (a removed auto-apply stays
        // removed). The one-bottle-return rule applies here too.
        for d in &eligible {
            if !d.auto_apply
                || self.selected.iter().any(|id| id == &d.id)
                || self.auto_applied.contains(&d.id)
            {
                continue;
            }
            if d.kind == DiscountKind::BottleReturn && self.has_bottle_return(catalog) {
                continue;
            }
            info!(discount = %d.name, "discount auto-applied");
            self.selected.push(d.id.clone());
            self.auto_applied.insert(d.id.clone());
            self.notices.push(DraftNotice::AutoApplied {
                discount_name: d.name.clone(),
            });
        }

        // Stale selections (no longer eligible) stay selected but
        // contribute zero; discount_amount re-verifies per discount.
        let selected_discounts = self
            .selected
            .iter()
            .filter_map(|id| catalog.iter().find(|d| &d.id == id));
        self.derived.discount_amount =
            discount::total_discount_amount(selected_discounts, &self.cart, now);

        self.derived.totals = totals_for_cart(
            &self.cart,
            self.derived.discount_amount,
            self.payment_status,
        );

        self.dirty = false;
    }

    // -------------------------------------------------------------------------
    // Reads (call `recompute` first)
    // -------------------------------------------------------------------------

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn customer(&self) -> Option<&Customer> {
        self.customer.as_ref()
    }

    pub fn payment_method(&self) -> Option<PaymentMethod> {
        self.payment_method
    }

    pub fn payment_status(&self) -> Option<PaymentStatus> {
        self.payment_status
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Ids of the currently selected discounts.
    pub fn selected_discounts(&self) -> &[String] {
        &self.selected
    }

    /// Ids of the currently eligible discounts.
    pub fn eligible_discounts(&self) -> &[String] {
        debug_assert!(!self.dirty, "recompute() before reading derived state");
        &self.derived.eligible_ids
    }

    pub fn discount_amount(&self) -> Money {
        debug_assert!(!self.dirty, "recompute() before reading derived state");
        self.derived.discount_amount
    }

    pub fn totals(&self) -> Totals {
        debug_assert!(!self.dirty, "recompute() before reading derived state");
        self.derived.totals
    }

    /// Drains pending user-facing notices.
    pub fn drain_notices(&mut self) -> Vec<DraftNotice> {
        std::mem::take(&mut self.notices)
    }

    /// Consumes the "discount catalog needs refetch" flag.
    pub fn take_discount_refetch(&mut self) -> Option<crate::backend::DiscountFilter> {
        if !self.discount_refetch_needed {
            return None;
        }
        self.discount_refetch_needed = false;
        Some(crate::backend::DiscountFilter {
            active: Some(true),
            payment_status: self.payment_status,
        })
    }

    /// Resets the entire draft to its initial Building state.
    /// Called only after a successful submission round-trip.
    pub fn reset(&mut self) {
        *self = OrderDraft::new();
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
