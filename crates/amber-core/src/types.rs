//! # Domain Types
//!
//! Core domain types used throughout Amber POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                │
//! │                                                                     │
//! │  ┌───────────────┐   ┌───────────────┐   ┌───────────────┐         │
//! │  │   Product     │   │   Customer    │   │     Role      │         │
//! │  │ ───────────── │   │ ───────────── │   │ ───────────── │         │
//! │  │ id, sku       │   │ id, name      │   │ Cashier       │         │
//! │  │ price_minor   │   │ email, phone  │   │ Admin         │         │
//! │  │ shop/global   │   │ is_walk_in    │   └───────────────┘         │
//! │  │ stock         │   │ loyalty       │                             │
//! │  └───────────────┘   └───────────────┘                             │
//! │                                                                     │
//! │  PaymentMethod · PaymentStatus · OrderStatus                        │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Products and customers are read-only snapshots fetched from the backend
//! catalog; the engine never mutates them, only the walk-in synthesis path
//! creates a new customer.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

/// Product type tag used when a product carries none.
///
/// Discount allowlists compare against this tag, so "no type" and
/// "general" must behave identically.
pub const GENERAL_PRODUCT_TYPE: &str = "general";

/// Product type that gets free-form quantity entry in the shell
/// (fast multi-unit entry, validated on commit instead of per keystroke).
pub const PERFUME_PRODUCT_TYPE: &str = "perfume";

// =============================================================================
// Role
// =============================================================================

/// Privilege level of the operator driving the order form.
///
/// Stock visibility is role-dependent: a cashier sees the shop-scoped
/// quantity, an admin sees the global quantity across shops. The role is
/// passed explicitly into cart operations rather than read from ambient
/// state, which keeps the dependency visible and testable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Shop-scoped operator: sells against the local shop quantity.
    Cashier,
    /// Privileged operator: sells against the global quantity.
    Admin,
}

impl Role {
    /// Whether this role sells against global stock.
    #[inline]
    pub const fn is_privileged(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product from the backend catalog, read-only.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier (UUID v4 from the backend).
    pub id: String,

    /// Display name shown to the cashier and on the receipt.
    pub name: String,

    /// Stock Keeping Unit - business identifier.
    pub sku: String,

    /// Barcode (EAN-13, UPC-A, etc.), when the product carries one.
    pub barcode: Option<String>,

    /// Unit price in minor currency units.
    pub price_minor: i64,

    /// ISO currency code ("NGN", "USD", ...).
    pub currency: String,

    /// Free-form product type tag ("perfume", "general", ...).
    /// Discount allowlists match against this.
    pub product_type: Option<String>,

    /// Quantity available in the operator's shop.
    pub shop_stock: i64,

    /// Quantity available across all shops.
    pub global_stock: i64,

    /// Whether the product is active (soft delete).
    pub is_active: bool,
}

impl Product {
    /// Returns the unit price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_minor(self.price_minor)
    }

    /// Returns the product type tag, defaulting to "general".
    pub fn product_type(&self) -> &str {
        self.product_type.as_deref().unwrap_or(GENERAL_PRODUCT_TYPE)
    }

    /// Stock visible to the given role: global for privileged roles,
    /// shop-scoped otherwise.
    pub fn available_stock(&self, role: Role) -> i64 {
        if role.is_privileged() {
            self.global_stock
        } else {
            self.shop_stock
        }
    }
}

// =============================================================================
// Customer
// =============================================================================

/// Local-part prefix of generated walk-in emails.
///
/// Kept stable so the pattern fallback below keeps recognizing walk-in
/// records created by older builds.
pub const WALK_IN_EMAIL_PREFIX: &str = "walkin";

/// A customer from the backend catalog, read-only.
///
/// ## Walk-in Customers
/// When no customer is selected at checkout, the assembler synthesizes a
/// placeholder "walk-in" record. New records carry the explicit
/// `is_walk_in` flag; records created before the flag existed are
/// recognized by name/email pattern as a compatibility fallback.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,

    /// Loyalty tier label ("bronze", "silver", ...), if enrolled.
    pub loyalty_tier: Option<String>,

    /// Accumulated loyalty points.
    pub loyalty_points: i64,

    /// Explicit walk-in marker, set once at creation time.
    #[serde(default)]
    pub is_walk_in: bool,
}

impl Customer {
    /// Whether this customer is a walk-in placeholder.
    ///
    /// Prefers the explicit flag; falls back to structural detection
    /// (name "Walk-in"/"Customer", or a generated walk-in email) for
    /// externally-sourced records that predate the flag.
    pub fn is_walk_in_customer(&self) -> bool {
        if self.is_walk_in {
            return true;
        }
        self.first_name.eq_ignore_ascii_case("walk-in")
            || self.full_name().eq_ignore_ascii_case("walk-in customer")
            || self.email.starts_with(WALK_IN_EMAIL_PREFIX)
    }

    /// Full display name.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

// =============================================================================
// Payment
// =============================================================================

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash payment.
    Cash,
    /// Card payment on external terminal.
    Card,
    /// Mobile money transfer.
    MobileMoney,
    /// Direct bank transfer.
    BankTransfer,
}

/// Whether the order is paid in full at checkout.
///
/// `Pending` is the partial-payment path: 50% due now, 50% later. It also
/// narrows discount eligibility: only discounts explicitly flagged for
/// partial payment survive the transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Paid in full at checkout.
    Complete,
    /// Partial payment: half now, half later.
    Pending,
}

/// Resulting status of a submitted order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Completed,
    Pending,
}

impl From<PaymentStatus> for OrderStatus {
    fn from(status: PaymentStatus) -> Self {
        match status {
            PaymentStatus::Complete => OrderStatus::Completed,
            PaymentStatus::Pending => OrderStatus::Pending,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
