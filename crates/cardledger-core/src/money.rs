//! Money types for cardledger.
//!
//! [`Balance`] and [`Amount`] wrap `rust_decimal::Decimal` to enforce the
//! ledger's money rules: exact fixed-point arithmetic with two fractional
//! digits, and transfer amounts that are always strictly positive.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

use crate::error::LedgerError;

/// A card balance.
///
/// Balances are plain fixed-point values; the no-negative-balance invariant
/// is enforced by the operations that mutate them, not by this type.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Balance(Decimal);

impl Balance {
    /// The zero balance.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a balance from a decimal value.
    #[must_use]
    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Return the underlying decimal value.
    #[must_use]
    pub const fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for Balance {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Balance {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl AddAssign for Balance {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Balance {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

/// A transfer amount.
///
/// Always strictly positive with at most two fractional digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    /// Create an amount from a decimal value.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidAmount`] if the value is zero or
    /// negative, or carries more than two fractional digits.
    pub fn new(value: Decimal) -> Result<Self, LedgerError> {
        if value <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(
                "amount must be positive".to_string(),
            ));
        }
        if value != value.round_dp(2) {
            return Err(LedgerError::InvalidAmount(
                "amount must have at most two fractional digits".to_string(),
            ));
        }
        Ok(Self(value))
    }

    /// Return the underlying decimal value.
    #[must_use]
    pub const fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = LedgerError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl From<Amount> for Balance {
    fn from(amount: Amount) -> Self {
        Balance(amount.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn balance_arithmetic() {
        let a = Balance::new(dec!(10.00));
        let b = Balance::new(dec!(2.50));
        assert_eq!(a + b, Balance::new(dec!(12.50)));
        assert_eq!(a - b, Balance::new(dec!(7.50)));
    }

    #[test]
    fn balance_assign_ops() {
        let mut balance = Balance::new(dec!(100.00));
        balance -= Balance::new(dec!(40.00));
        balance += Balance::new(dec!(1.00));
        assert_eq!(balance, Balance::new(dec!(61.00)));
    }

    #[test]
    fn amount_must_be_positive() {
        assert!(Amount::new(dec!(0.01)).is_ok());
        assert!(matches!(
            Amount::new(dec!(0)),
            Err(LedgerError::InvalidAmount(_))
        ));
        assert!(matches!(
            Amount::new(dec!(-5.00)),
            Err(LedgerError::InvalidAmount(_))
        ));
    }

    #[test]
    fn amount_rejects_sub_cent_precision() {
        assert!(matches!(
            Amount::new(dec!(1.005)),
            Err(LedgerError::InvalidAmount(_))
        ));
        assert!(Amount::new(dec!(1.50)).is_ok());
    }

    #[test]
    fn amount_serde_enforces_invariant() {
        let parsed: Result<Amount, _> = serde_json::from_str("\"-1.00\"");
        assert!(parsed.is_err());

        let amount: Amount = serde_json::from_str("\"99.99\"").unwrap();
        assert_eq!(amount.value(), dec!(99.99));
    }

    #[test]
    fn amount_converts_to_balance() {
        let amount = Amount::new(dec!(12.34)).unwrap();
        assert_eq!(Balance::from(amount), Balance::new(dec!(12.34)));
    }
}
