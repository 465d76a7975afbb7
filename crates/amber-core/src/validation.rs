//! # Submit-Time Validation
//!
//! Field-level validation run by the assembler before anything leaves for
//! the backend.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  Layer 1: Shell inputs (eager/deferred quantity entry, see cart)    │
//! │  Layer 2: Cart invariants (clamp on every mutation)                 │
//! │  Layer 3: THIS MODULE - full draft re-check at submit time          │
//! │                                                                     │
//! │  Layer 3 exists because the draft can drift: stock ceilings were    │
//! │  captured at add time and the payment fields start unselected.      │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every failure is returned (not just the first) so the shell can mark
//! all offending fields in one pass.

use crate::cart::Cart;
use crate::error::ValidationError;
use crate::types::{PaymentMethod, PaymentStatus};

/// Validates the complete draft before submission.
///
/// ## Checks
/// - cart is non-empty
/// - every line's quantity is within its availability ceiling
/// - a payment method is selected
/// - a payment status is selected
///
/// Returns all field errors at once, or `Ok(())` when the draft is
/// submittable.
pub fn validate_order(
    cart: &Cart,
    payment_method: Option<PaymentMethod>,
    payment_status: Option<PaymentStatus>,
) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if cart.is_empty() {
        errors.push(ValidationError::EmptyCart);
    }

    for line in cart.items() {
        if line.quantity > line.available_stock {
            errors.push(ValidationError::LineExceedsStock {
                name: line.name.clone(),
                quantity: line.quantity,
                available: line.available_stock,
            });
        }
    }

    if payment_method.is_none() {
        errors.push(ValidationError::Required {
            field: "payment method".to_string(),
        });
    }

    if payment_status.is_none() {
        errors.push(ValidationError::Required {
            field: "payment status".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates free-text notes: optional, but capped to keep payloads sane.
pub fn validate_notes(notes: &str) -> Result<(), ValidationError> {
    if notes.len() > 1000 {
        return Err(ValidationError::InvalidFormat {
            field: "notes".to_string(),
            reason: "must be at most 1000 characters".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Product, Role};

    fn product(id: &str, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            sku: format!("SKU-{}", id),
            barcode: None,
            price_minor: 1000,
            currency: "NGN".to_string(),
            product_type: None,
            shop_stock: stock,
            global_stock: stock,
            is_active: true,
        }
    }

    #[test]
    fn test_empty_cart_blocks_submit() {
        let cart = Cart::new();
        let errors = validate_order(&cart, Some(PaymentMethod::Cash), Some(PaymentStatus::Complete))
            .unwrap_err();
        assert!(errors.contains(&ValidationError::EmptyCart));
    }

    #[test]
    fn test_missing_payment_fields_reported_together() {
        let mut cart = Cart::new();
        cart.add_item(&product("1", 5), Role::Cashier, false).unwrap();

        let errors = validate_order(&cart, None, None).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0], ValidationError::Required { .. }));
        assert!(matches!(errors[1], ValidationError::Required { .. }));
    }

    #[test]
    fn test_valid_draft_passes() {
        let mut cart = Cart::new();
        cart.add_item(&product("1", 5), Role::Cashier, false).unwrap();

        assert!(
            validate_order(&cart, Some(PaymentMethod::Card), Some(PaymentStatus::Pending)).is_ok()
        );
    }

    #[test]
    fn test_notes_length() {
        assert!(validate_notes("gift wrap please").is_ok());
        assert!(validate_notes(&"x".repeat(1001)).is_err());
    }
}
