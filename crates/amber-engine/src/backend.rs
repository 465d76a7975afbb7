//! # Backend Request Interface
//!
//! The generic request surface the engine consumes. The real REST client
//! lives in the shell; tests use an in-memory implementation. The engine
//! never knows or cares which it is talking to.
//!
//! ## Error Contract
//! `create_customer` must fail *distinctly* on duplicate-identity conflicts
//! ([`BackendError::Duplicate`]) so the assembler can surface that exact
//! message. Every other failure collapses to [`BackendError::Request`] and
//! gets a generic fallback message at the UI boundary.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

use amber_core::{
    Customer, DiscountKind, Money, OrderStatus, PaymentMethod, PaymentStatus, Product,
};

// =============================================================================
// Errors
// =============================================================================

/// Failure raised by the external request interface.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Duplicate-identity conflict (e.g. customer email already exists).
    /// The message is passed through to the user verbatim.
    #[error("{0}")]
    Duplicate(String),

    /// Any other request failure. The message is logged; users see a
    /// generic fallback.
    #[error("{0}")]
    Request(String),
}

// =============================================================================
// Request/Response Types
// =============================================================================

/// Filter for the discount catalog fetch.
///
/// The backend scopes some discounts by payment status, which is why the
/// draft refetches the catalog when the status flips to pending.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountFilter {
    pub active: Option<bool>,
    pub payment_status: Option<PaymentStatus>,
}

/// Fields for customer creation (walk-in synthesis).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomer {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub is_walk_in: bool,
}

/// One line of the submitted order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub line_total: Money,
}

/// A discount as it was applied to the order, for the backend's records.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AppliedDiscount {
    pub discount_id: String,
    pub kind: DiscountKind,
    pub value: i64,
}

/// The full payload the assembler produces for `create_order`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    pub customer_id: String,
    pub reference: String,
    pub invoice_number: String,
    pub lines: Vec<OrderLine>,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub notes: Option<String>,
    pub currency: String,
    pub subtotal: Money,
    pub tax: Money,
    pub discount: Money,
    pub total: Money,
    pub amount_paid: Money,
    pub remaining: Money,
    /// Pending iff payment status is Pending.
    pub status: OrderStatus,
    pub applied_discounts: Vec<AppliedDiscount>,
}

/// What the backend returns for a committed order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    pub order_id: String,
    pub reference: String,
}

// =============================================================================
// Backend Trait
// =============================================================================

/// The external request interface.
///
/// All calls are async; the engine issues them one at a time (submission is
/// a serialized customer-create/order-create sequence, never concurrent).
pub trait Backend {
    fn list_products(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<Product>, BackendError>> + Send;

    fn list_customers(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<Customer>, BackendError>> + Send;

    fn list_discounts(
        &self,
        filter: DiscountFilter,
    ) -> impl std::future::Future<Output = Result<Vec<amber_core::Discount>, BackendError>> + Send;

    fn create_customer(
        &self,
        fields: NewCustomer,
    ) -> impl std::future::Future<Output = Result<Customer, BackendError>> + Send;

    fn create_order(
        &self,
        payload: OrderPayload,
    ) -> impl std::future::Future<Output = Result<OrderConfirmation, BackendError>> + Send;
}
