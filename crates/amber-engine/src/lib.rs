//! # amber-engine: Order Draft Orchestration for Amber POS
//!
//! Everything between [`amber_core`] and the outside world.
//!
//! ## Modules
//!
//! - [`backend`] - The generic request interface the engine consumes
//!   (products, customers, discounts, customer/order creation)
//! - [`catalog`] - In-memory catalog snapshot with on-demand refresh
//! - [`draft`] - The reactive order draft (dirty-flag recomputation)
//! - [`assembler`] - The checkout state machine
//!
//! ## Typical Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  open form                                                          │
//! │    ├── CatalogCache::refresh_products / refresh_customers           │
//! │    └── CatalogCache::refresh_discounts (non-fatal on failure)       │
//! │                                                                     │
//! │  build order (all synchronous, in-memory)                           │
//! │    ├── OrderAssembler::draft_mut().add_item / set_quantity / ...    │
//! │    ├── draft.recompute(catalog, now) before derived reads           │
//! │    └── draft.drain_notices() → shell toasts                         │
//! │                                                                     │
//! │  checkout                                                           │
//! │    ├── OrderAssembler::begin_review(catalog) → summary totals       │
//! │    └── OrderAssembler::submit(backend, catalog).await → Receipt     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Single-threaded by design: one draft per form, no shared mutable state
//! across drafts, one submission in flight at a time.

pub mod assembler;
pub mod backend;
pub mod catalog;
pub mod draft;

pub use assembler::{OrderAssembler, Phase, Receipt, ReceiptLine, SubmitError};
pub use backend::{
    AppliedDiscount, Backend, BackendError, DiscountFilter, NewCustomer, OrderConfirmation,
    OrderLine, OrderPayload,
};
pub use catalog::CatalogCache;
pub use draft::{DraftNotice, OrderDraft};
