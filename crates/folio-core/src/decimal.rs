//! Precision-safe decimal types for the settlement engine.
//!
//! Uses `rust_decimal` for exact decimal arithmetic, avoiding
//! floating-point rounding errors critical in P&L calculations.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

/// Absolute tolerance for step-alignment and remaining-quantity comparisons.
///
/// Decimal division by a step that is not a power of two can leave a
/// representation tail; comparisons against exchange grids use this margin
/// instead of exact equality.
pub const STEP_TOLERANCE: Decimal = dec!(0.000000001);

/// Price with exact decimal precision.
///
/// Wraps `Decimal` to provide type safety and prevent mixing
/// prices with quantities in calculations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(pub Decimal);

impl Price {
    pub const ZERO: Self = Self(Decimal::ZERO);

    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Price {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl From<Decimal> for Price {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}

/// Quantity of an asset with exact decimal precision.
///
/// Wraps `Decimal` to provide type safety and prevent mixing
/// quantities with prices in calculations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(pub Decimal);

impl Quantity {
    pub const ZERO: Self = Self(Decimal::ZERO);

    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// True if `self <= other` within [`STEP_TOLERANCE`].
    #[inline]
    pub fn fits_within(&self, other: Quantity) -> bool {
        self.0 <= other.0 + STEP_TOLERANCE
    }

    /// True if `self == other` within [`STEP_TOLERANCE`].
    #[inline]
    pub fn approx_eq(&self, other: Quantity) -> bool {
        (self.0 - other.0).abs() <= STEP_TOLERANCE
    }

    /// Round down to the step grid.
    #[inline]
    pub fn round_down_to_step(&self, step: Quantity) -> Self {
        if step.is_zero() {
            return *self;
        }
        Self((self.0 / step.0).floor() * step.0)
    }

    /// Round up to the step grid.
    #[inline]
    pub fn round_up_to_step(&self, step: Quantity) -> Self {
        if step.is_zero() {
            return *self;
        }
        Self((self.0 / step.0).ceil() * step.0)
    }

    /// Check whether this quantity sits on the step grid,
    /// within [`STEP_TOLERANCE`] of a grid point.
    pub fn is_step_multiple(&self, step: Quantity) -> bool {
        if step.is_zero() {
            return true;
        }
        let remainder = self.0 - (self.0 / step.0).floor() * step.0;
        remainder <= STEP_TOLERANCE || (step.0 - remainder).abs() <= STEP_TOLERANCE
    }

    /// Truncate toward zero at `digits` decimal places.
    ///
    /// Used after grid rounding so the emitted quantity carries exactly the
    /// precision the step size implies, with no arithmetic tail.
    #[inline]
    pub fn truncate_to_digits(&self, digits: u32) -> Self {
        Self(self.0.trunc_with_scale(digits).normalize())
    }

    /// Number of decimal places carried by this value.
    ///
    /// `0.001` -> 3, `0.010` -> 2, `1` -> 0.
    pub fn fraction_digits(&self) -> u32 {
        let s = self.0.to_string();
        if let Some(pos) = s.find('.') {
            s[pos + 1..].trim_end_matches('0').len() as u32
        } else {
            0
        }
    }

    /// Notional value: quantity * price.
    #[inline]
    pub fn notional(&self, price: Price) -> Decimal {
        self.0 * price.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Quantity {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl From<Decimal> for Quantity {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}

impl Add for Quantity {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Quantity {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_down_to_step() {
        let qty = Quantity::new(dec!(0.0057));
        let step = Quantity::new(dec!(0.001));

        assert_eq!(qty.round_down_to_step(step).inner(), dec!(0.005));
    }

    #[test]
    fn test_round_up_to_step() {
        let qty = Quantity::new(dec!(0.0015));
        let step = Quantity::new(dec!(0.001));

        assert_eq!(qty.round_up_to_step(step).inner(), dec!(0.002));
    }

    #[test]
    fn test_round_to_step_zero_step_passthrough() {
        let qty = Quantity::new(dec!(1.2345));
        assert_eq!(qty.round_down_to_step(Quantity::ZERO), qty);
        assert_eq!(qty.round_up_to_step(Quantity::ZERO), qty);
    }

    #[test]
    fn test_is_step_multiple() {
        let step = Quantity::new(dec!(0.001));

        assert!(Quantity::new(dec!(0.005)).is_step_multiple(step));
        assert!(Quantity::new(dec!(1)).is_step_multiple(step));
        assert!(!Quantity::new(dec!(0.0057)).is_step_multiple(step));
        assert!(!Quantity::new(dec!(0.0005)).is_step_multiple(step));
    }

    #[test]
    fn test_is_step_multiple_within_tolerance() {
        let step = Quantity::new(dec!(0.001));

        // A grid point with a sub-tolerance tail still counts as aligned.
        assert!(Quantity::new(dec!(0.0050000000001)).is_step_multiple(step));
        assert!(Quantity::new(dec!(0.0049999999999)).is_step_multiple(step));
    }

    #[test]
    fn test_fraction_digits() {
        assert_eq!(Quantity::new(dec!(0.001)).fraction_digits(), 3);
        assert_eq!(Quantity::new(dec!(0.010)).fraction_digits(), 2);
        assert_eq!(Quantity::new(dec!(0.00000001)).fraction_digits(), 8);
        assert_eq!(Quantity::new(dec!(1)).fraction_digits(), 0);
        assert_eq!(Quantity::new(dec!(100)).fraction_digits(), 0);
    }

    #[test]
    fn test_truncate_to_digits() {
        let qty = Quantity::new(dec!(0.0057999));
        assert_eq!(qty.truncate_to_digits(3).inner(), dec!(0.005));

        // Truncation never rounds up.
        let qty = Quantity::new(dec!(1.2399));
        assert_eq!(qty.truncate_to_digits(2).inner(), dec!(1.23));
    }

    #[test]
    fn test_fits_within() {
        let remaining = Quantity::new(dec!(1.0));

        assert!(Quantity::new(dec!(1.0)).fits_within(remaining));
        assert!(Quantity::new(dec!(0.5)).fits_within(remaining));
        assert!(!Quantity::new(dec!(1.01)).fits_within(remaining));
        // Sub-tolerance overshoot is forgiven.
        assert!(Quantity::new(dec!(1.0000000000005)).fits_within(remaining));
    }

    #[test]
    fn test_notional_calculation() {
        let qty = Quantity::new(dec!(0.4));
        let price = Price::new(dec!(22000));

        assert_eq!(qty.notional(price), dec!(8800));
    }
}
