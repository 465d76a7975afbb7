//! # Cart Model
//!
//! The ordered collection of line items behind the order form.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Cart Model Operations                            │
//! │                                                                     │
//! │  Shell Action             Operation               State Change      │
//! │  ────────────             ─────────               ────────────      │
//! │  Click / scan product ──► add_item() ───────────► push or qty += 1  │
//! │  Edit quantity ─────────► set_quantity() ───────► clamp / remove    │
//! │  Click remove ──────────► remove_item() ────────► items.remove(i)   │
//! │  Successful submit ─────► clear() ──────────────► items.clear()     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Stock Invariant
//! Every line satisfies `0 < quantity <= available_stock` where
//! `available_stock` is the ceiling captured when the line was added
//! (role-dependent: shop quantity for cashiers, global for admins).
//! Violations are clamped or rejected with a reported warning, never
//! silently dropped.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{Product, Role, PERFUME_PRODUCT_TYPE};

// =============================================================================
// Line Item
// =============================================================================

/// A line item in the cart.
///
/// ## Snapshot Pattern
/// Product data is denormalized at add time. If the catalog changes after
/// the line was added (price update, stock movement elsewhere), this line
/// keeps displaying and pricing what the cashier saw.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Product ID (for the order payload and catalog lookups).
    pub product_id: String,

    /// Name at time of adding (frozen).
    pub name: String,

    /// SKU at time of adding (frozen).
    pub sku: String,

    /// Barcode at time of adding (frozen).
    pub barcode: Option<String>,

    /// Unit price in minor units at time of adding (frozen).
    pub unit_price_minor: i64,

    /// Currency code at time of adding (frozen).
    pub currency: String,

    /// Product type tag at time of adding (frozen, defaulted to "general").
    pub product_type: String,

    /// Quantity in cart. Invariant: `0 < quantity <= available_stock`.
    pub quantity: i64,

    /// Availability ceiling captured at add time for the operator's role.
    pub available_stock: i64,

    /// Whether the line was added via barcode scan.
    pub via_barcode: bool,
}

impl LineItem {
    fn from_product(product: &Product, role: Role, via_barcode: bool) -> Self {
        LineItem {
            product_id: product.id.clone(),
            name: product.name.clone(),
            sku: product.sku.clone(),
            barcode: product.barcode.clone(),
            unit_price_minor: product.price_minor,
            currency: product.currency.clone(),
            product_type: product.product_type().to_string(),
            quantity: 1,
            available_stock: product.available_stock(role),
            via_barcode,
        }
    }

    /// Unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_minor(self.unit_price_minor)
    }

    /// Line total = unit price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }

    /// Whether this line uses deferred (free-form) quantity entry.
    pub fn defers_quantity_entry(&self) -> bool {
        self.product_type == PERFUME_PRODUCT_TYPE
    }
}

// =============================================================================
// Quantity Change Outcome
// =============================================================================

/// What `set_quantity` actually did.
///
/// Clamps are reported rather than swallowed so the shell can warn the
/// cashier; the invariant is enforced either way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum QuantityChange {
    /// Quantity set as requested.
    Updated { quantity: i64 },
    /// Requested quantity exceeded availability and was clamped down.
    Clamped { requested: i64, quantity: i64 },
    /// Quantity <= 0 removed the line.
    Removed,
}

// =============================================================================
// Cart
// =============================================================================

/// The cart behind an order draft.
///
/// ## Invariants
/// - Lines are unique by `product_id` (re-adding increments quantity)
/// - Every line satisfies `0 < quantity <= available_stock`
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { items: Vec::new() }
    }

    /// Read-only view of the line items.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Adds a product to the cart, or increments its quantity by one.
    ///
    /// ## Behavior
    /// - Already in cart: quantity += 1, unless that would exceed the
    ///   line's availability ceiling (`StockLimit`, no state change)
    /// - Not in cart: availability is computed for the caller's role and
    ///   a single unit is added; zero availability is `OutOfStock`
    pub fn add_item(&mut self, product: &Product, role: Role, via_barcode: bool) -> CoreResult<()> {
        if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product.id) {
            if item.quantity + 1 > item.available_stock {
                return Err(CoreError::StockLimit {
                    name: item.name.clone(),
                    available: item.available_stock,
                });
            }
            item.quantity += 1;
            return Ok(());
        }

        let available = product.available_stock(role);
        if available <= 0 {
            return Err(CoreError::OutOfStock {
                name: product.name.clone(),
            });
        }

        self.items
            .push(LineItem::from_product(product, role, via_barcode));
        Ok(())
    }

    /// Sets the quantity of a line.
    ///
    /// ## Behavior
    /// - `quantity <= 0`: removes the line (`Removed`)
    /// - `quantity > available_stock`: clamps to the ceiling (`Clamped`)
    /// - otherwise: sets as requested (`Updated`)
    ///
    /// The line total follows the quantity automatically since it is
    /// derived in [`LineItem::line_total`].
    pub fn set_quantity(&mut self, product_id: &str, quantity: i64) -> CoreResult<QuantityChange> {
        if quantity <= 0 {
            self.remove_item(product_id)?;
            return Ok(QuantityChange::Removed);
        }

        let item = self
            .items
            .iter_mut()
            .find(|i| i.product_id == product_id)
            .ok_or_else(|| CoreError::ProductNotInCart {
                product_id: product_id.to_string(),
            })?;

        if quantity > item.available_stock {
            item.quantity = item.available_stock;
            return Ok(QuantityChange::Clamped {
                requested: quantity,
                quantity: item.available_stock,
            });
        }

        item.quantity = quantity;
        Ok(QuantityChange::Updated { quantity })
    }

    /// Removes a line by product ID.
    pub fn remove_item(&mut self, product_id: &str) -> CoreResult<()> {
        let initial_len = self.items.len();
        self.items.retain(|i| i.product_id != product_id);

        if self.items.len() == initial_len {
            Err(CoreError::ProductNotInCart {
                product_id: product_id.to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Clears all lines. Called only after a successful submission.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of all line totals.
    pub fn subtotal(&self) -> Money {
        self.items.iter().map(|i| i.line_total()).sum()
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    /// Total quantity across all lines.
    pub fn unit_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// =============================================================================
// Quantity Entry
// =============================================================================

/// Free-form quantity entry buffer for the shell's quantity inputs.
///
/// Perfume lines allow fast multi-unit entry (typing "50" in one go), so
/// their text is only parsed when the input commits (blur/enter). Every
/// other product type validates on each keystroke. This is purely a UX
/// affordance: the committed value still goes through
/// [`Cart::set_quantity`], so the clamp invariant applies uniformly.
#[derive(Debug, Clone)]
pub struct QuantityEntry {
    raw: String,
    deferred: bool,
}

impl QuantityEntry {
    /// Creates an entry buffer for a line's product type.
    pub fn for_product_type(product_type: &str) -> Self {
        QuantityEntry {
            raw: String::new(),
            deferred: product_type == PERFUME_PRODUCT_TYPE,
        }
    }

    /// Whether parse errors are deferred to commit.
    pub fn is_deferred(&self) -> bool {
        self.deferred
    }

    /// Accepts a keystroke's worth of input.
    ///
    /// Deferred entries accept anything and sort it out at commit; eager
    /// entries reject text that is not a plain positive integer.
    pub fn input(&mut self, text: &str) -> Result<(), ValidationError> {
        if !self.deferred {
            Self::parse(text)?;
        }
        self.raw = text.to_string();
        Ok(())
    }

    /// Parses the buffered text into a quantity at commit time.
    pub fn commit(&self) -> Result<i64, ValidationError> {
        Self::parse(&self.raw)
    }

    fn parse(text: &str) -> Result<i64, ValidationError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Required {
                field: "quantity".to_string(),
            });
        }
        trimmed
            .parse::<i64>()
            .ok()
            .filter(|q| *q > 0)
            .ok_or_else(|| ValidationError::InvalidFormat {
                field: "quantity".to_string(),
                reason: "must be a positive whole number".to_string(),
            })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
