//! # Money Module
//!
//! Provides the `Money` type for Turkish lira amounts.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A ledger that compares `total - paid` with zero cannot afford that:   │
//! │  a sale paid in full would show 0,0000000001 ₺ still due.              │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Kuruş                                            │
//! │    21.520,00 ₺ = 2_152_000 kuruş                                        │
//! │    round(total - paid, 2) is plain integer subtraction                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use kuyum_core::money::Money;
//!
//! let price = Money::from_cents(1_099);       // 10,99 ₺
//! let line = price * 2;                       // 21,98 ₺
//! let total = line + Money::from_major(5);    // 26,98 ₺
//! assert_eq!(total.cents(), 2_698);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A lira amount in kuruş (1/100 lira).
///
/// ## Design Decisions
/// - **i64 (signed)**: purchase ledger entries carry negative amounts
/// - **Single field tuple struct**: zero-cost wrapper over i64
/// - **Serialized as the raw kuruş integer**, like every `_cents` column
///
/// ## Where Money is Used
/// ```text
/// line_total ──► gross ──► total (gross - discount) ──► due (total - paid)
///                                     │
///                                     └──► customer balance / cash ledger
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from kuruş.
    ///
    /// ```rust
    /// use kuyum_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole lira.
    #[inline]
    pub const fn from_major(lira: i64) -> Self {
        Money(lira * 100)
    }

    /// Creates a Money value from lira and kuruş.
    ///
    /// For negative amounts only the major unit carries the sign:
    /// `from_major_minor(-5, 50)` is -5,50 ₺.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Converts a float amount, rounding half away from zero to the kuruş.
    ///
    /// Only used at the input boundary where a caller hands over a native
    /// float. Ledger arithmetic never goes back to floats.
    pub fn from_f64(amount: f64) -> Option<Self> {
        if !amount.is_finite() {
            return None;
        }
        let cents = (amount * 100.0).round();
        if cents.abs() > i64::MAX as f64 {
            return None;
        }
        Some(Money(cents as i64))
    }

    /// Returns the value in kuruş.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-lira portion.
    ///
    /// ```rust
    /// use kuyum_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1099).lira(), 10);
    /// assert_eq!(Money::from_cents(-550).lira(), -5);
    /// ```
    #[inline]
    pub const fn lira(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the kuruş portion (always 0-99).
    #[inline]
    pub const fn kurus_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Floors the value at zero.
    ///
    /// ```rust
    /// use kuyum_core::money::Money;
    ///
    /// let gross = Money::from_major(100);
    /// let discount = Money::from_major(150);
    /// assert_eq!((gross - discount).clamp_zero(), Money::zero());
    /// ```
    #[inline]
    pub const fn clamp_zero(self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            self
        }
    }

    /// Adds two amounts, returning None on overflow.
    ///
    /// ```rust
    /// use kuyum_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1).checked_add(Money::from_cents(2)), Some(Money::from_cents(3)));
    /// assert_eq!(Money::from_cents(i64::MAX).checked_add(Money::from_cents(1)), None);
    /// ```
    #[inline]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Multiplies a unit price by an item quantity, returning None on overflow.
    #[inline]
    pub const fn checked_mul(self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    #[inline]
    pub const fn saturating_add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }

    #[inline]
    pub const fn saturating_mul(self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Turkish display format: `1.234,56 ₺`.
///
/// Used for log lines and error messages. The desktop frontend does its own
/// locale-aware formatting.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let digits = self.lira().abs().to_string();

        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }

        write!(f, "{}{},{:02} ₺", sign, grouped, self.kurus_part())
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

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.lira(), 10);
        assert_eq!(money.kurus_part(), 99);
    }

    #[test]
    fn test_from_major_minor() {
        assert_eq!(Money::from_major_minor(10, 99).cents(), 1099);
        assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    }

    #[test]
    fn test_from_f64_rounds_to_kurus() {
        assert_eq!(Money::from_f64(200.0), Some(Money::from_major(200)));
        assert_eq!(Money::from_f64(0.1 + 0.2), Some(Money::from_cents(30)));
        assert_eq!(Money::from_f64(0.125), Some(Money::from_cents(13)));
        assert_eq!(Money::from_f64(f64::NAN), None);
        assert_eq!(Money::from_f64(f64::INFINITY), None);
    }

    #[test]
    fn test_display_turkish_format() {
        assert_eq!(Money::from_cents(1099).to_string(), "10,99 ₺");
        assert_eq!(Money::from_major(21_520).to_string(), "21.520,00 ₺");
        assert_eq!(Money::from_cents(123_456_789).to_string(), "1.234.567,89 ₺");
        assert_eq!(Money::from_cents(-550).to_string(), "-5,50 ₺");
        assert_eq!(Money::zero().to_string(), "0,00 ₺");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_major(10);
        let b = Money::from_major(5);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);
        assert_eq!((-a).cents(), -1000);
    }

    #[test]
    fn test_checked_arithmetic_reports_overflow() {
        let big = Money::from_cents(i64::MAX / 2 + 1);
        assert_eq!(big.checked_add(big), None);
        assert_eq!(big.checked_mul(2), None);
        assert_eq!(Money::from_major(10).checked_mul(3), Some(Money::from_major(30)));

        assert_eq!(big.saturating_add(big), Money::from_cents(i64::MAX));
        assert_eq!(big.saturating_mul(4), Money::from_cents(i64::MAX));
    }

    #[test]
    fn test_sum() {
        let lines = vec![Money::from_major(200), Money::from_cents(50), Money::from_major(1)];
        let gross: Money = lines.iter().sum();
        assert_eq!(gross.cents(), 20_150);
    }

    #[test]
    fn test_clamp_zero() {
        assert_eq!(Money::from_cents(-1).clamp_zero(), Money::zero());
        assert_eq!(Money::from_cents(7).clamp_zero(), Money::from_cents(7));
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        assert!(Money::from_cents(100).is_positive());
        assert!(Money::from_cents(-100).is_negative());
    }
}
