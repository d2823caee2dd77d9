//! Monetary amounts in kopecks.
//!
//! The gateway carries every amount (payment totals, item prices, shop splits,
//! receipt payments) as an integer number of kopecks. [`Amount`] wraps that
//! integer and offers a checked conversion from a ruble [`Decimal`].

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::error::AmountError;

/// An amount of money in kopecks (1/100 of a ruble).
///
/// # Serialization
///
/// Serialized as a bare JSON integer:
///
/// ```json
/// 12000
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(u64);

impl Amount {
    /// Zero kopecks.
    pub const ZERO: Self = Self(0);

    /// Creates an amount from a raw number of kopecks.
    #[must_use]
    pub const fn from_kopecks(kopecks: u64) -> Self {
        Self(kopecks)
    }

    /// Converts a ruble value into kopecks.
    ///
    /// ```rust
    /// use rust_decimal::Decimal;
    /// use tkassa::Amount;
    ///
    /// let amount = Amount::from_rubles(Decimal::new(12050, 2)).unwrap();
    /// assert_eq!(amount.kopecks(), 12050);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`AmountError`] if the value is negative, has more than two
    /// fractional digits, or overflows `u64` kopecks.
    pub fn from_rubles(rubles: Decimal) -> Result<Self, AmountError> {
        if rubles.is_sign_negative() && !rubles.is_zero() {
            return Err(AmountError::Negative(rubles.to_string()));
        }
        let kopecks = rubles
            .checked_mul(Decimal::ONE_HUNDRED)
            .ok_or_else(|| AmountError::Overflow(rubles.to_string()))?;
        if !kopecks.fract().is_zero() {
            return Err(AmountError::SubKopeck(rubles.to_string()));
        }
        kopecks
            .to_u64()
            .map(Self)
            .ok_or_else(|| AmountError::Overflow(rubles.to_string()))
    }

    /// Returns the raw number of kopecks.
    #[must_use]
    pub const fn kopecks(&self) -> u64 {
        self.0
    }

    /// Returns the amount in rubles.
    #[must_use]
    pub fn rubles(&self) -> Decimal {
        Decimal::from(self.0) / Decimal::ONE_HUNDRED
    }

    /// Adds two amounts, returning `None` on overflow.
    #[must_use]
    pub const fn checked_add(self, rhs: Self) -> Option<Self> {
        match self.0.checked_add(rhs.0) {
            Some(sum) => Some(Self(sum)),
            None => None,
        }
    }
}

impl From<u64> for Amount {
    fn from(kopecks: u64) -> Self {
        Self(kopecks)
    }
}

/// Parses a ruble string such as `"120"` or `"99.90"`.
impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rubles = Decimal::from_str(s.trim()).map_err(|_| AmountError::Invalid(s.to_owned()))?;
        Self::from_rubles(rubles)
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rubles_whole() {
        let amount = Amount::from_rubles(Decimal::new(120, 0)).unwrap();
        assert_eq!(amount.kopecks(), 12_000);
    }

    #[test]
    fn test_from_rubles_fractional() {
        let amount = Amount::from_rubles(Decimal::new(9990, 2)).unwrap();
        assert_eq!(amount.kopecks(), 9_990);
        assert_eq!(amount.rubles(), Decimal::new(9990, 2));
    }

    #[test]
    fn test_from_rubles_trailing_zeros_are_fine() {
        let amount = Amount::from_rubles(Decimal::new(150_000, 4)).unwrap();
        assert_eq!(amount.kopecks(), 1_500);
    }

    #[test]
    fn test_from_rubles_rejects_sub_kopeck() {
        let err = Amount::from_rubles(Decimal::new(1001, 3)).unwrap_err();
        assert!(matches!(err, AmountError::SubKopeck(_)));
    }

    #[test]
    fn test_from_rubles_rejects_negative() {
        let err = Amount::from_rubles(Decimal::new(-1, 0)).unwrap_err();
        assert!(matches!(err, AmountError::Negative(_)));
    }

    #[test]
    fn test_parse_ruble_string() {
        let amount: Amount = "99.90".parse().unwrap();
        assert_eq!(amount, Amount::from_kopecks(9_990));
        assert!("abc".parse::<Amount>().is_err());
    }

    #[test]
    fn test_serializes_as_integer() {
        let json = serde_json::to_string(&Amount::from_kopecks(12_000)).unwrap();
        assert_eq!(json, "12000");
        let back: Amount = serde_json::from_str("19200").unwrap();
        assert_eq!(back.kopecks(), 19_200);
    }

    #[test]
    fn test_display_in_rubles() {
        assert_eq!(Amount::from_kopecks(12_005).to_string(), "120.05");
        assert_eq!(Amount::ZERO.to_string(), "0.00");
    }
}
