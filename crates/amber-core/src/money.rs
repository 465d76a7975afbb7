//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  In floating point: 0.1 + 0.2 = 0.30000000000000004  ❌             │
//! │                                                                     │
//! │  OUR SOLUTION: integer minor units (i64)                            │
//! │    price, subtotal, tax, discount, total - ALL minor units          │
//! │    Only the UI converts to a display string                         │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Percentages (tax rate, percentage discounts) are expressed in basis
//! points: 1 bps = 0.01%, so 1800 bps = 18%.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate in basis points (1800 = 18%).
///
/// Tax in Amber POS is informational: it is computed and reported on every
/// order but never added to the payable total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// ## Design Decisions
/// - **i64 (signed)**: allows negative values for corrections and refunds
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Derives**: full serde support for JSON serialization
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor currency units.
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Multiplies a unit price by a line quantity.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Returns the smaller of two amounts.
    ///
    /// Used to cap fixed-amount and bottle-return discounts at the subtotal
    /// of the lines they apply to.
    #[inline]
    pub fn min(self, other: Money) -> Money {
        Money(self.0.min(other.0))
    }

    /// Computes a basis-point fraction of this amount, rounded half-up.
    ///
    /// ## Example
    /// ```rust
    /// use amber_core::money::Money;
    ///
    /// let subtotal = Money::from_minor(5000);
    /// assert_eq!(subtotal.percentage_bps(1000).minor(), 500); // 10%
    /// ```
    ///
    /// Uses i128 internally so large carts cannot overflow.
    pub fn percentage_bps(&self, bps: u32) -> Money {
        let part = (self.0 as i128 * bps as i128 + 5000) / 10000;
        Money(part as i64)
    }

    /// Computes the informational tax amount at the given rate.
    pub fn tax(&self, rate: TaxRate) -> Money {
        self.percentage_bps(rate.bps())
    }

    /// Splits an amount into a (due now, remaining) pair for partial payment.
    ///
    /// The customer pays 50% up front. For odd totals the extra minor unit
    /// lands in the up-front half so the two parts always reconstruct the
    /// whole: `due + remaining == self`.
    pub fn half_split(&self) -> (Money, Money) {
        let due = (self.0 + 1) / 2;
        (Money(due), Money(self.0 - due))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows the raw minor-unit amount; the shell owns currency
/// formatting and localization.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
