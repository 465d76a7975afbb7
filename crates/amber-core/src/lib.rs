//! # amber-core: Pure Business Logic for Amber POS
//!
//! This crate is the **heart** of the Amber POS order-construction engine.
//! It contains the rules governing how line items, stock availability,
//! discount eligibility, and totals interact, as pure functions with zero
//! I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     Amber POS Architecture                          │
//! │                                                                     │
//! │  ┌───────────────────────────────────────────────────────────────┐ │
//! │  │                  React shell (external)                       │ │
//! │  │    Product search ─► Cart UI ─► Discounts ─► Checkout         │ │
//! │  └───────────────────────────────┬───────────────────────────────┘ │
//! │                                  │ generated bindings              │
//! │  ┌───────────────────────────────▼───────────────────────────────┐ │
//! │  │            amber-engine (catalog, draft, assembler)           │ │
//! │  └───────────────────────────────┬───────────────────────────────┘ │
//! │                                  │                                 │
//! │  ┌───────────────────────────────▼───────────────────────────────┐ │
//! │  │                ★ amber-core (THIS CRATE) ★                    │ │
//! │  │                                                               │ │
//! │  │  ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌─────────┐ ┌────────┐ │ │
//! │  │  │  money  │ │  cart   │ │ discount │ │ pricing │ │ valid. │ │ │
//! │  │  └─────────┘ └─────────┘ └──────────┘ └─────────┘ └────────┘ │ │
//! │  │                                                               │ │
//! │  │  NO I/O • NO BACKEND • NO ASYNC • PURE FUNCTIONS              │ │
//! │  └───────────────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Customer, payment enums)
//! - [`money`] - Integer money and basis-point percentages (no floats!)
//! - [`cart`] - Cart model with the stock invariant
//! - [`discount`] - Discount eligibility gates and amount computation
//! - [`pricing`] - Subtotal/tax/total/partial-payment math
//! - [`validation`] - Submit-time field validation
//! - [`error`] - Typed domain errors
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input = same output, always
//! 2. **No I/O**: backend, file system, clock reads are FORBIDDEN here
//!    (callers pass `now` in explicitly)
//! 3. **Integer Money**: all monetary values are i64 minor units
//! 4. **Explicit Errors**: all errors are typed, never strings or panics

pub mod cart;
pub mod discount;
pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// Re-exports for convenience: `use amber_core::Money` instead of
// `use amber_core::money::Money`.
pub use cart::{Cart, LineItem, QuantityChange, QuantityEntry};
pub use discount::{Discount, DiscountKind, EvalContext};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Money, TaxRate};
pub use pricing::{compute_totals, totals_for_cart, Totals, TAX_RATE};
pub use types::{
    Customer, OrderStatus, PaymentMethod, PaymentStatus, Product, Role,
};
