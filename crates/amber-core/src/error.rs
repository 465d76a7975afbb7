//! # Error Types
//!
//! Domain-specific error types for amber-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  amber-core errors (this file)                                      │
//! │  ├── CoreError        - Cart and discount rule violations           │
//! │  └── ValidationError  - Submit-time field validation failures       │
//! │                                                                     │
//! │  amber-engine errors (separate crate)                               │
//! │  ├── BackendError     - External request failures                   │
//! │  └── SubmitError      - Assembler state machine failures            │
//! │                                                                     │
//! │  Flow: ValidationError → CoreError → SubmitError → UI shell         │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product name, availability)
//! 3. Errors are enum variants, never String
//! 4. Every error here is recoverable: it is scoped to one draft operation

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations raised by cart and discount operations.
///
/// None of these mutate draft state: the operation that raised the error is
/// rejected and the draft stays exactly as it was.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// Product has zero availability for the operator's role.
    #[error("{name} is out of stock")]
    OutOfStock { name: String },

    /// Incrementing an existing line would exceed its availability ceiling.
    #[error("Only {available} unit(s) of {name} available")]
    StockLimit { name: String, available: i64 },

    /// Quantity edit targeted a product that is not in the cart.
    #[error("Product not in cart: {product_id}")]
    ProductNotInCart { product_id: String },

    /// A bottle-return discount is already selected; only one may be
    /// active at a time.
    #[error("Only one bottle return discount can be applied at a time")]
    BottleReturnConflict,

    /// Attempted to select a discount that is not in the eligible set.
    #[error("Discount is not eligible for this order: {name}")]
    DiscountNotEligible { name: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Submit-time field validation errors.
///
/// Each variant names the offending field so the shell can attach the
/// message to the right input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Cart has no line items.
    #[error("Cannot submit an order with an empty cart")]
    EmptyCart,

    /// A line quantity exceeds its availability ceiling.
    #[error("{name}: quantity {quantity} exceeds available stock {available}")]
    LineExceedsStock {
        name: String,
        quantity: i64,
        available: i64,
    },

    /// Free-form quantity entry did not parse as a positive integer.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::StockLimit {
            name: "Oud Royale 50ml".to_string(),
            available: 3,
        };
        assert_eq!(err.to_string(), "Only 3 unit(s) of Oud Royale 50ml available");

        let err = CoreError::BottleReturnConflict;
        assert_eq!(
            err.to_string(),
            "Only one bottle return discount can be applied at a time"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "payment method".to_string(),
        };
        assert_eq!(err.to_string(), "payment method is required");

        let err = ValidationError::LineExceedsStock {
            name: "Amber Mist".to_string(),
            quantity: 9,
            available: 5,
        };
        assert_eq!(
            err.to_string(),
            "Amber Mist: quantity 9 exceeds available stock 5"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::EmptyCart;
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
