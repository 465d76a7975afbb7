//! # Order Assembler
//!
//! The checkout state machine: validates the draft, synthesizes a walk-in
//! customer when none is selected, produces the order payload, and resets
//! the draft after a committed submission.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                                                                     │
//! │   Building ──begin_review()──► Reviewing ──submit()──► Submitting   │
//! │      ▲                            │  ▲                     │        │
//! │      │◄──────cancel_review()──────┘  │                     │        │
//! │      │                               └──── failure ────────┤        │
//! │      │                                  (draft preserved)  │        │
//! │      └────────────── success: draft reset ─────────────────┘        │
//! │                      + Receipt artifact                             │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Submission is a serialized external call sequence: optional
//! `create_customer` (walk-in synthesis), then `create_order`. A guard
//! rejects re-entrant submits while one is in flight. Backend failures
//! surface duplicate-conflict messages verbatim and hide everything else
//! behind a generic fallback; either way the draft survives for retry.

use chrono::Utc;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use amber_core::{
    validation, Customer, Discount, Money, PaymentMethod, PaymentStatus, Totals, ValidationError,
};
use amber_core::types::WALK_IN_EMAIL_PREFIX;

use crate::backend::{
    AppliedDiscount, Backend, BackendError, NewCustomer, OrderLine, OrderPayload,
};
use crate::draft::OrderDraft;

/// Fallback message for non-duplicate backend failures. The real error is
/// logged, not shown.
const GENERIC_SUBMIT_ERROR: &str = "Order submission failed. Please try again.";

// =============================================================================
// Errors
// =============================================================================

/// Failures raised by the checkout flow.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// Field-level validation failures; the shell maps each to its input.
    #[error("order validation failed")]
    Validation(Vec<ValidationError>),

    /// Backend rejection, already reduced to its user-facing message.
    #[error("{message}")]
    Backend { message: String },

    /// A submission is already in flight for this draft.
    #[error("submission already in progress")]
    AlreadySubmitting,

    /// `submit` was called outside the Reviewing phase.
    #[error("checkout has not been requested")]
    NotReviewing,
}

// =============================================================================
// Phase & Receipt
// =============================================================================

/// Where the assembler is in the checkout flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Entry state: draft fields mutable.
    #[default]
    Building,
    /// Checkout requested: summary shown, still cancelable.
    Reviewing,
    /// External calls in flight.
    Submitting,
}

/// One printable receipt line.
#[derive(Debug, Clone)]
pub struct ReceiptLine {
    pub name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub line_total: Money,
}

/// The artifact handed to the shell after a committed order. Rendering
/// and printing are the shell's concern; producing this is ours.
#[derive(Debug, Clone)]
pub struct Receipt {
    pub order_id: String,
    pub reference: String,
    pub invoice_number: String,
    pub customer_name: String,
    pub lines: Vec<ReceiptLine>,
    pub totals: Totals,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub timestamp: String,
}

// =============================================================================
// Assembler
// =============================================================================

/// Owns one draft and drives it through checkout.
#[derive(Debug)]
pub struct OrderAssembler {
    draft: OrderDraft,
    phase: Phase,
    reference: Option<String>,
    invoice_number: Option<String>,
}

impl Default for OrderAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderAssembler {
    pub fn new() -> Self {
        OrderAssembler {
            draft: OrderDraft::new(),
            phase: Phase::Building,
            reference: None,
            invoice_number: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Read access to the draft.
    pub fn draft(&self) -> &OrderDraft {
        &self.draft
    }

    /// Mutable access to the draft.
    ///
    /// Mutating during review implicitly cancels it: the summary the
    /// cashier approved is no longer the one that would be submitted.
    pub fn draft_mut(&mut self) -> &mut OrderDraft {
        if self.phase == Phase::Reviewing {
            self.phase = Phase::Building;
        }
        &mut self.draft
    }

    /// The human-readable order reference, once review has started.
    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    /// Requests checkout: freshens derived values, generates the order
    /// reference and invoice number if absent, and moves to Reviewing.
    pub fn begin_review(&mut self, catalog: &[Discount]) -> Totals {
        self.draft.recompute(catalog, Utc::now());

        if self.reference.is_none() {
            self.reference = Some(generate_reference());
        }
        if self.invoice_number.is_none() {
            self.invoice_number = Some(generate_invoice_number());
        }

        self.phase = Phase::Reviewing;
        self.draft.totals()
    }

    /// Cancels review and returns to Building. The draft is untouched.
    pub fn cancel_review(&mut self) {
        if self.phase == Phase::Reviewing {
            self.phase = Phase::Building;
        }
    }

    /// Runs the full submission sequence.
    ///
    /// ## Sequence
    /// 1. re-entrancy and phase guards
    /// 2. re-run validation (failures keep the draft in Reviewing)
    /// 3. synthesize a walk-in customer if none is selected
    /// 4. submit the order payload
    /// 5. on success: reset the draft, return the receipt
    ///
    /// Any backend failure returns to Reviewing with the draft intact so
    /// the cashier can retry.
    pub async fn submit<B: Backend>(
        &mut self,
        backend: &B,
        catalog: &[Discount],
    ) -> Result<Receipt, SubmitError> {
        match self.phase {
            Phase::Submitting => return Err(SubmitError::AlreadySubmitting),
            Phase::Building => return Err(SubmitError::NotReviewing),
            Phase::Reviewing => {}
        }
        self.phase = Phase::Submitting;

        let now = Utc::now();
        self.draft.recompute(catalog, now);

        if let Err(errors) = validation::validate_order(
            self.draft.cart(),
            self.draft.payment_method(),
            self.draft.payment_status(),
        ) {
            self.phase = Phase::Reviewing;
            return Err(SubmitError::Validation(errors));
        }

        // Both payment fields validated present above.
        let payment_method = self
            .draft
            .payment_method()
            .ok_or(SubmitError::NotReviewing)?;
        let payment_status = self
            .draft
            .payment_status()
            .ok_or(SubmitError::NotReviewing)?;

        // Walk-in synthesis: no customer selected means the backend gets a
        // freshly created placeholder record.
        let customer = match self.draft.customer() {
            Some(c) => c.clone(),
            None => {
                info!("no customer selected, synthesizing walk-in");
                match backend.create_customer(walk_in_fields()).await {
                    Ok(c) => c,
                    Err(err) => {
                        self.phase = Phase::Reviewing;
                        return Err(map_backend_error(err, "walk-in customer creation"));
                    }
                }
            }
        };

        let reference = self.reference.clone().unwrap_or_else(generate_reference);
        let invoice_number = self
            .invoice_number
            .clone()
            .unwrap_or_else(generate_invoice_number);

        let totals = self.draft.totals();
        let payload = self.build_payload(
            &customer,
            catalog,
            &reference,
            &invoice_number,
            payment_method,
            payment_status,
            totals,
        );

        let confirmation = match backend.create_order(payload).await {
            Ok(c) => c,
            Err(err) => {
                self.phase = Phase::Reviewing;
                return Err(map_backend_error(err, "order creation"));
            }
        };

        info!(
            order_id = %confirmation.order_id,
            reference = %reference,
            total = %totals.total,
            "order committed"
        );

        let receipt = Receipt {
            order_id: confirmation.order_id,
            reference,
            invoice_number,
            customer_name: customer.full_name(),
            lines: self
                .draft
                .cart()
                .items()
                .iter()
                .map(|l| ReceiptLine {
                    name: l.name.clone(),
                    quantity: l.quantity,
                    unit_price: l.unit_price(),
                    line_total: l.line_total(),
                })
                .collect(),
            totals,
            payment_method,
            payment_status,
            timestamp: now.to_rfc3339(),
        };

        // Committed: the entire draft goes back to the Building initial
        // state. Only a successful round-trip gets here.
        self.draft.reset();
        self.reference = None;
        self.invoice_number = None;
        self.phase = Phase::Building;

        Ok(receipt)
    }

    #[allow(clippy::too_many_arguments)]
    fn build_payload(
        &self,
        customer: &Customer,
        catalog: &[Discount],
        reference: &str,
        invoice_number: &str,
        payment_method: PaymentMethod,
        payment_status: PaymentStatus,
        totals: Totals,
    ) -> OrderPayload {
        let applied_discounts = self
            .draft
            .selected_discounts()
            .iter()
            .filter_map(|id| catalog.iter().find(|d| &d.id == id))
            .map(|d| AppliedDiscount {
                discount_id: d.id.clone(),
                kind: d.kind,
                value: d.value,
            })
            .collect();

        let lines: Vec<OrderLine> = self
            .draft
            .cart()
            .items()
            .iter()
            .map(|l| OrderLine {
                product_id: l.product_id.clone(),
                quantity: l.quantity,
                unit_price: l.unit_price(),
                line_total: l.line_total(),
            })
            .collect();

        let currency = self
            .draft
            .cart()
            .items()
            .first()
            .map(|l| l.currency.clone())
            .unwrap_or_default();

        let notes = self.draft.notes();
        OrderPayload {
            customer_id: customer.id.clone(),
            reference: reference.to_string(),
            invoice_number: invoice_number.to_string(),
            lines,
            payment_method,
            payment_status,
            notes: if notes.is_empty() {
                None
            } else {
                Some(notes.to_string())
            },
            currency,
            subtotal: totals.subtotal,
            tax: totals.tax,
            discount: totals.discount,
            total: totals.total,
            amount_paid: totals.amount_due,
            remaining: totals.remaining,
            status: payment_status.into(),
            applied_discounts,
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn map_backend_error(err: BackendError, stage: &str) -> SubmitError {
    match err {
        // Duplicate-identity conflicts are passed through verbatim so the
        // cashier sees exactly what collided.
        BackendError::Duplicate(message) => {
            warn!(stage, %message, "duplicate conflict from backend");
            SubmitError::Backend { message }
        }
        BackendError::Request(message) => {
            error!(stage, %message, "backend request failed");
            SubmitError::Backend {
                message: GENERIC_SUBMIT_ERROR.to_string(),
            }
        }
    }
}

/// Identity fields for a synthesized walk-in customer.
///
/// Email and phone must be unique per synthesis: timestamp plus a random
/// suffix. Not globally coordinated; see the collision note on
/// [`generate_reference`].
fn walk_in_fields() -> NewCustomer {
    let ts = Utc::now().timestamp();
    let tag = Uuid::new_v4();
    let suffix = tag.simple().to_string();
    NewCustomer {
        first_name: "Walk-in".to_string(),
        last_name: "Customer".to_string(),
        email: format!("{}{}-{}@pos.local", WALK_IN_EMAIL_PREFIX, ts, &suffix[..8]),
        phone: format!("0{}{:06}", ts % 1_000_000, tag.as_u128() % 1_000_000),
        is_walk_in: true,
    }
}

/// Generates a human-readable order reference.
///
/// Timestamp-derived with a random tail. Readable and good enough for a
/// single terminal, but not guaranteed globally unique under concurrent
/// submissions; the backend's order id is the authoritative key.
fn generate_reference() -> String {
    let now = Utc::now();
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    format!("ORD-{}-{:04}", now.format("%y%m%d-%H%M%S"), nanos % 10000)
}

/// Generates an invoice number in the same scheme as the order reference.
fn generate_invoice_number() -> String {
    let now = Utc::now();
    let suffix = Uuid::new_v4().simple().to_string();
    format!("INV-{}-{}", now.format("%Y%m%d"), &suffix[..6].to_uppercase())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use amber_core::{DiscountKind, Product, Role};

    use crate::backend::{DiscountFilter, OrderConfirmation};

    fn product(id: &str, price_minor: i64, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            sku: format!("SKU-{}", id),
            barcode: None,
            price_minor,
            currency: "NGN".to_string(),
            product_type: Some("perfume".to_string()),
            shop_stock: stock,
            global_stock: stock,
            is_active: true,
        }
    }

    fn percentage(id: &str, value: i64) -> Discount {
        Discount {
            id: id.to_string(),
            name: format!("{}% off", value),
            description: None,
            kind: DiscountKind::Percentage,
            value,
            bottle_return_count: None,
            applicable_product_types: None,
            min_purchase_minor: None,
            is_active: true,
            starts_at: None,
            ends_at: None,
            auto_apply: false,
            allow_partial_payment: false,
        }
    }

    /// In-memory backend capturing calls and simulating failures.
    #[derive(Default)]
    struct MockBackend {
        created_customers: Mutex<Vec<NewCustomer>>,
        submitted_orders: Mutex<Vec<OrderPayload>>,
        customer_error: Option<BackendError>,
        order_error: Option<BackendError>,
    }

    impl Backend for MockBackend {
        async fn list_products(&self) -> Result<Vec<Product>, BackendError> {
            Ok(Vec::new())
        }

        async fn list_customers(&self) -> Result<Vec<Customer>, BackendError> {
            Ok(Vec::new())
        }

        async fn list_discounts(
            &self,
            _filter: DiscountFilter,
        ) -> Result<Vec<Discount>, BackendError> {
            Ok(Vec::new())
        }

        async fn create_customer(&self, fields: NewCustomer) -> Result<Customer, BackendError> {
            if let Some(err) = &self.customer_error {
                return Err(err.clone());
            }
            self.created_customers.lock().unwrap().push(fields.clone());
            Ok(Customer {
                id: "walkin-1".to_string(),
                first_name: fields.first_name,
                last_name: fields.last_name,
                email: fields.email,
                phone: fields.phone,
                loyalty_tier: None,
                loyalty_points: 0,
                is_walk_in: fields.is_walk_in,
            })
        }

        async fn create_order(
            &self,
            payload: OrderPayload,
        ) -> Result<OrderConfirmation, BackendError> {
            if let Some(err) = &self.order_error {
                return Err(err.clone());
            }
            let reference = payload.reference.clone();
            self.submitted_orders.lock().unwrap().push(payload);
            Ok(OrderConfirmation {
                order_id: "order-1".to_string(),
                reference,
            })
        }
    }

    fn ready_assembler() -> OrderAssembler {
        let mut assembler = OrderAssembler::new();
        let draft = assembler.draft_mut();
        draft
            .add_item(&product("1", 1000, 10), Role::Cashier, false)
            .unwrap();
        draft.set_quantity("1", 2).unwrap();
        draft.set_payment_method(PaymentMethod::Cash);
        draft.set_payment_status(PaymentStatus::Complete);
        assembler
    }

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("amber_engine=debug")
            .try_init();
    }

    #[tokio::test]
    async fn test_submit_synthesizes_walk_in_and_resets() {
        init_tracing();
        let backend = MockBackend::default();
        let catalog: Vec<Discount> = Vec::new();
        let mut assembler = ready_assembler();

        assembler.begin_review(&catalog);
        let receipt = assembler.submit(&backend, &catalog).await.unwrap();

        // Walk-in was synthesized with the generated identity pattern.
        let created = backend.created_customers.lock().unwrap();
        assert_eq!(created.len(), 1);
        assert!(created[0].is_walk_in);
        assert!(created[0].email.starts_with(WALK_IN_EMAIL_PREFIX));

        // Payload carried the derived amounts.
        let orders = backend.submitted_orders.lock().unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].customer_id, "walkin-1");
        assert_eq!(orders[0].subtotal.minor(), 2000);
        assert_eq!(orders[0].tax.minor(), 360);
        assert_eq!(orders[0].total.minor(), 2000);
        assert_eq!(orders[0].amount_paid.minor(), 2000);
        assert_eq!(orders[0].remaining.minor(), 0);
        assert_eq!(orders[0].status, amber_core::OrderStatus::Completed);

        // Receipt artifact and full draft reset.
        assert_eq!(receipt.lines.len(), 1);
        assert!(receipt.reference.starts_with("ORD-"));
        assert!(receipt.invoice_number.starts_with("INV-"));
        assert_eq!(assembler.phase(), Phase::Building);
        assert!(assembler.draft().cart().is_empty());
        assert!(assembler.reference().is_none());
    }

    #[test]
    fn test_walk_in_identity_unique_within_second() {
        // Two syntheses in the same second must still differ, so the
        // random tail has to reach both the email and the phone.
        let a = walk_in_fields();
        let b = walk_in_fields();
        assert_ne!(a.email, b.email);
        assert_ne!(a.phone, b.phone);
    }

    #[tokio::test]
    async fn test_pending_payment_payload_split() {
        let backend = MockBackend::default();
        let catalog: Vec<Discount> = Vec::new();
        let mut assembler = ready_assembler();
        assembler
            .draft_mut()
            .set_payment_status(PaymentStatus::Pending);

        assembler.begin_review(&catalog);
        assembler.submit(&backend, &catalog).await.unwrap();

        let orders = backend.submitted_orders.lock().unwrap();
        assert_eq!(orders[0].amount_paid.minor(), 1000);
        assert_eq!(orders[0].remaining.minor(), 1000);
        assert_eq!(orders[0].status, amber_core::OrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_applied_discounts_in_payload() {
        let backend = MockBackend::default();
        let catalog = vec![percentage("d1", 10)];
        let mut assembler = ready_assembler();
        assembler
            .draft_mut()
            .toggle_discount("d1", &catalog, Utc::now())
            .unwrap();

        assembler.begin_review(&catalog);
        assembler.submit(&backend, &catalog).await.unwrap();

        let orders = backend.submitted_orders.lock().unwrap();
        assert_eq!(orders[0].discount.minor(), 200); // 10% of 2000
        assert_eq!(orders[0].total.minor(), 1800);
        assert_eq!(orders[0].applied_discounts.len(), 1);
        assert_eq!(orders[0].applied_discounts[0].discount_id, "d1");
    }

    #[tokio::test]
    async fn test_validation_failure_blocks_submit() {
        let backend = MockBackend::default();
        let catalog: Vec<Discount> = Vec::new();
        let mut assembler = OrderAssembler::new();
        // Empty cart, no payment fields.
        assembler.begin_review(&catalog);

        let err = assembler.submit(&backend, &catalog).await.unwrap_err();
        match err {
            SubmitError::Validation(errors) => {
                assert!(errors.contains(&ValidationError::EmptyCart));
                assert_eq!(errors.len(), 3); // cart + method + status
            }
            other => panic!("expected validation failure, got {other:?}"),
        }

        // Nothing reached the backend; draft still reviewable.
        assert!(backend.submitted_orders.lock().unwrap().is_empty());
        assert!(backend.created_customers.lock().unwrap().is_empty());
        assert_eq!(assembler.phase(), Phase::Reviewing);
    }

    #[tokio::test]
    async fn test_duplicate_conflict_passed_through_verbatim() {
        let backend = MockBackend {
            customer_error: Some(BackendError::Duplicate(
                "Customer with this email already exists".to_string(),
            )),
            ..Default::default()
        };
        let catalog: Vec<Discount> = Vec::new();
        let mut assembler = ready_assembler();
        assembler.begin_review(&catalog);

        let err = assembler.submit(&backend, &catalog).await.unwrap_err();
        match err {
            SubmitError::Backend { message } => {
                assert_eq!(message, "Customer with this email already exists");
            }
            other => panic!("expected backend failure, got {other:?}"),
        }

        // Draft preserved for retry.
        assert_eq!(assembler.phase(), Phase::Reviewing);
        assert_eq!(assembler.draft().cart().line_count(), 1);
    }

    #[tokio::test]
    async fn test_generic_fallback_for_other_backend_errors() {
        let backend = MockBackend {
            order_error: Some(BackendError::Request("connection reset".to_string())),
            ..Default::default()
        };
        let catalog: Vec<Discount> = Vec::new();
        let mut assembler = ready_assembler();
        assembler.begin_review(&catalog);

        let err = assembler.submit(&backend, &catalog).await.unwrap_err();
        match err {
            SubmitError::Backend { message } => {
                assert_eq!(message, GENERIC_SUBMIT_ERROR);
            }
            other => panic!("expected backend failure, got {other:?}"),
        }
        assert_eq!(assembler.phase(), Phase::Reviewing);
    }

    #[tokio::test]
    async fn test_retry_after_failure_succeeds() {
        let failing = MockBackend {
            order_error: Some(BackendError::Request("timeout".to_string())),
            ..Default::default()
        };
        let catalog: Vec<Discount> = Vec::new();
        let mut assembler = ready_assembler();
        assembler.begin_review(&catalog);

        assert!(assembler.submit(&failing, &catalog).await.is_err());

        let working = MockBackend::default();
        let receipt = assembler.submit(&working, &catalog).await.unwrap();
        assert_eq!(receipt.totals.total.minor(), 2000);
        assert_eq!(assembler.phase(), Phase::Building);
    }

    #[tokio::test]
    async fn test_submit_requires_review() {
        let backend = MockBackend::default();
        let catalog: Vec<Discount> = Vec::new();
        let mut assembler = ready_assembler();

        let err = assembler.submit(&backend, &catalog).await.unwrap_err();
        assert!(matches!(err, SubmitError::NotReviewing));
    }

    #[tokio::test]
    async fn test_selected_customer_skips_walk_in_synthesis() {
        let backend = MockBackend::default();
        let catalog: Vec<Discount> = Vec::new();
        let mut assembler = ready_assembler();
        assembler.draft_mut().set_customer(
            Some(Customer {
                id: "c9".to_string(),
                first_name: "Ada".to_string(),
                last_name: "Obi".to_string(),
                email: "ada@example.com".to_string(),
                phone: "0801".to_string(),
                loyalty_tier: None,
                loyalty_points: 0,
                is_walk_in: false,
            }),
            &catalog,
        );

        assembler.begin_review(&catalog);
        assembler.submit(&backend, &catalog).await.unwrap();

        assert!(backend.created_customers.lock().unwrap().is_empty());
        let orders = backend.submitted_orders.lock().unwrap();
        assert_eq!(orders[0].customer_id, "c9");
    }

    #[test]
    fn test_mutation_during_review_cancels_it() {
        let catalog: Vec<Discount> = Vec::new();
        let mut assembler = ready_assembler();
        assembler.begin_review(&catalog);
        assert_eq!(assembler.phase(), Phase::Reviewing);

        assembler.draft_mut().set_notes("gift wrap");
        assert_eq!(assembler.phase(), Phase::Building);
    }

    #[test]
    fn test_reference_generated_once_per_review() {
        let catalog: Vec<Discount> = Vec::new();
        let mut assembler = ready_assembler();

        assembler.begin_review(&catalog);
        let first = assembler.reference().unwrap().to_string();

        assembler.cancel_review();
        assembler.begin_review(&catalog);
        assert_eq!(assembler.reference().unwrap(), first);
    }
}
