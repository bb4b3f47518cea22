//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE EQUAL SPLIT PROBLEM                                                │
//! │                                                                         │
//! │  With floating point:                                                   │
//! │    10.00 / 3 = 3.3333333333333335   ❌ nobody can pay that              │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units                                      │
//! │    1000 / 3 = 333 (×3 = 999)                                           │
//! │    We KNOW 1 unit is missing, and the ledger reports it explicitly     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use splitify_core::money::Money;
//!
//! let lunch = Money::from_minor(1000);
//! let each = lunch.split_evenly(3).unwrap();
//! assert_eq!(each.minor(), 333);
//! assert_eq!(lunch.minor() - each.minor() * 3, 1);
//! ```
//!
//! ## Overflow
//! The operators follow `i64` semantics and are only used on values already
//! known to be in range. Sums over caller-supplied amounts go through
//! [`Money::checked_sum`] and the other `checked_*` methods, which return
//! `None` instead of wrapping.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// ## Design Decisions
/// - **i64 (signed)**: shares are negative for participants who owe
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **No currency**: a ledger is single-currency by construction
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                                                                         │
/// │  Event.total ──► equal share ──► ShareMap (signed)                      │
/// │                                      │                                  │
/// │  Contribution.amount ────────────────┘                                  │
/// │                                      ▼                                  │
/// │                          DebitCreditMap (always positive)               │
/// │                                                                         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[serde(transparent)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Zero money value.
    pub const ZERO: Money = Money(0);

    /// Creates a Money value from minor units (cents, pence, ...).
    ///
    /// ## Example
    /// ```rust
    /// use splitify_core::money::Money;
    ///
    /// let price = Money::from_minor(1099);
    /// assert_eq!(price.minor(), 1099);
    /// ```
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.0 % 100).abs()
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

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// `self + other`, `None` on overflow.
    #[inline]
    pub const fn checked_add(self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(sum) => Some(Money(sum)),
            None => None,
        }
    }

    /// `self - other`, `None` on overflow.
    #[inline]
    pub const fn checked_sub(self, other: Money) -> Option<Money> {
        match self.0.checked_sub(other.0) {
            Some(difference) => Some(Money(difference)),
            None => None,
        }
    }

    /// `-self`, `None` for the one value without a positive counterpart.
    #[inline]
    pub const fn checked_neg(self) -> Option<Money> {
        match self.0.checked_neg() {
            Some(negated) => Some(Money(negated)),
            None => None,
        }
    }

    /// Exact sum of `values`, `None` if the result does not fit in `i64`.
    ///
    /// Accumulates in `i128`, so intermediate sums never overflow: only the
    /// final total has to be representable.
    ///
    /// ```rust
    /// use splitify_core::money::Money;
    ///
    /// let max = Money::from_minor(i64::MAX);
    /// assert_eq!(Money::checked_sum([max, Money::from_minor(1), Money::from_minor(-1)]), Some(max));
    /// assert_eq!(Money::checked_sum([max, max, Money::from_minor(2)]), None);
    /// ```
    pub fn checked_sum<I>(values: I) -> Option<Money>
    where
        I: IntoIterator<Item = Money>,
    {
        let total: i128 = values.into_iter().map(|value| i128::from(value.0)).sum();
        i64::try_from(total).ok().map(Money)
    }

    /// Divides the amount into `parts` equal parts, truncating toward zero.
    ///
    /// Returns `None` when `parts` is zero.
    ///
    /// ## Truncation
    /// ```text
    /// ┌─────────────────────────────────────────────────────────────────────┐
    /// │  1000 split 3 ways = 333 each                                       │
    /// │  333 × 3 = 999 → 1 unit is NOT assigned to anyone                   │
    /// │                                                                     │
    /// │  The lost remainder is at most (parts - 1) units. Share maps built  │
    /// │  from a truncated split therefore do not sum to zero, and the       │
    /// │  zero-sum check reports it instead of hiding it.                    │
    /// └─────────────────────────────────────────────────────────────────────┘
    /// ```
    ///
    /// ## Example
    /// ```rust
    /// use splitify_core::money::Money;
    ///
    /// assert_eq!(Money::from_minor(1000).split_evenly(4), Some(Money::from_minor(250)));
    /// assert_eq!(Money::from_minor(-7).split_evenly(2), Some(Money::from_minor(-3)));
    /// assert_eq!(Money::from_minor(1000).split_evenly(0), None);
    /// ```
    pub fn split_evenly(&self, parts: usize) -> Option<Money> {
        let parts = i64::try_from(parts).ok()?;
        self.0.checked_div(parts).map(Money)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows the amount with two decimal places and no currency symbol.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor_part())
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

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
