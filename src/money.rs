//! An exact currency amount with two decimal places.
//!
//! Amounts are stored in the database as an integer number of cents so that
//! `SUM` in SQL never accumulates floating point error.

use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, AddAssign, Sub},
};

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use serde::{Deserialize, Serialize};

use crate::Error;

/// The number of decimal places kept for an amount.
const SCALE: u32 = 2;

/// The largest amount accepted, 999,999,999,999.99.
///
/// Summing tens of thousands of maximum amounts in SQL still fits in an `i64`.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, SCALE);

/// A non-negative amount of money rounded to cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    /// An amount of zero.
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// Create an amount from a decimal, rounding half away from zero to cents.
    ///
    /// # Errors
    ///
    /// Returns [Error::NegativeAmount] if `value` is less than zero and
    /// [Error::AmountTooLarge] if it rounds to more than [MAX_AMOUNT].
    pub fn new(value: Decimal) -> Result<Self, Error> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(Error::NegativeAmount(value));
        }

        let rounded = round_to_cents(value);
        if rounded > MAX_AMOUNT {
            return Err(Error::AmountTooLarge(value));
        }

        Ok(Self(rounded))
    }

    /// Create an amount from a whole number of cents.
    ///
    /// Negative cents are clamped to zero.
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents.max(0), SCALE))
    }

    /// The amount as a whole number of cents.
    ///
    /// Always exact for amounts built with [Amount::new] or [Amount::from_cents].
    pub fn cents(&self) -> i64 {
        (self.0 * Decimal::ONE_HUNDRED)
            .trunc()
            .to_i64()
            .unwrap_or_default()
    }

    /// The underlying decimal value.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// A lossy conversion for charts and number formatting.
    pub fn as_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or_default()
    }

    /// Whether the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

fn round_to_cents(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(SCALE);
    rounded
}

impl TryFrom<Decimal> for Amount {
    type Error = Error;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Self) -> Self::Output {
        Amount(self.0 + rhs.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

/// Saturates at zero since an amount is never negative.
impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Self) -> Self::Output {
        Amount((self.0 - rhs.0).max(Decimal::ZERO))
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl ToSql for Amount {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.cents()))
    }
}

impl FromSql for Amount {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Integer(cents) => Ok(Amount::from_cents(cents)),
            // `SUM` over an empty set yields NULL.
            ValueRef::Null => Ok(Amount::ZERO),
            _ => Err(FromSqlError::InvalidType),
        }
    }
}
