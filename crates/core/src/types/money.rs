//! Chilean peso amounts.
//!
//! CLP is a zero-decimal currency: every price in the catalog and every
//! order total is a whole number of pesos. Amounts are stored as `i64`
//! and formatted to the es-CL convention (`$12.345`) only at render
//! time.
//!
//! The backend API is not consistent about how it serializes prices:
//! the catalog endpoint emits JSON numbers while some order payloads
//! carry already-formatted strings. [`Money`] normalizes both shapes at
//! the deserialization boundary so the rest of the codebase only ever
//! sees numeric amounts.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, AddAssign};

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors that can occur when parsing a [`Money`] amount.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    /// The input contains no digits at all.
    #[error("amount contains no digits: {0:?}")]
    NoDigits(String),
    /// The digits overflow an `i64`.
    #[error("amount out of range: {0:?}")]
    OutOfRange(String),
}

/// A whole-peso CLP amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

impl Money {
    /// Create an amount from whole pesos.
    #[must_use]
    pub const fn new(amount: i64) -> Self {
        Self(amount)
    }

    /// The zero amount.
    #[must_use]
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Whether this amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// The amount in whole pesos.
    #[must_use]
    pub const fn amount(&self) -> i64 {
        self.0
    }

    /// Multiply by a quantity (line totals).
    #[must_use]
    pub const fn times(&self, quantity: u32) -> Self {
        Self(self.0 * quantity as i64)
    }

    /// Subtract, clamping at zero.
    ///
    /// Used for presentation-only derivations such as "shipping portion
    /// of an order total" where a negative result only means the inputs
    /// disagree and must not be shown.
    #[must_use]
    pub const fn saturating_sub(&self, other: Self) -> Self {
        let diff = self.0 - other.0;
        if diff < 0 { Self(0) } else { Self(diff) }
    }

    /// Parse a lenient amount: every non-digit character is stripped
    /// before parsing, so `"$6.990"`, `"CLP 6.990"` and `"6990"` all
    /// yield 6990.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::NoDigits`] if the input contains no digit
    /// at all (an empty or purely symbolic string is a data error, not
    /// a zero amount), and [`MoneyError::OutOfRange`] on overflow.
    pub fn parse_lenient(input: &str) -> Result<Self, MoneyError> {
        let digits: String = input.chars().filter(char::is_ascii_digit).collect();
        if digits.is_empty() {
            return Err(MoneyError::NoDigits(input.to_owned()));
        }
        digits
            .parse::<i64>()
            .map(Self)
            .map_err(|_| MoneyError::OutOfRange(input.to_owned()))
    }

    /// Format to the es-CL convention: `$` prefix, `.` as thousands
    /// separator, no decimals (`Money(14300)` → `"$14.300"`).
    #[must_use]
    pub fn format_clp(&self) -> String {
        let negative = self.0 < 0;
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 2);
        let offset = digits.len() % 3;
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (i + 3 - offset) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(c);
        }
        if negative {
            format!("-${grouped}")
        } else {
            format!("${grouped}")
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_clp())
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), Add::add)
    }
}

impl From<i64> for Money {
    fn from(amount: i64) -> Self {
        Self(amount)
    }
}

impl From<Money> for i64 {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.0)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MoneyVisitor;

        impl Visitor<'_> for MoneyVisitor {
            type Value = Money;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a peso amount as a number or formatted string")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
                Ok(Money(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
                i64::try_from(v)
                    .map(Money)
                    .map_err(|_| E::custom("amount out of range"))
            }

            #[allow(clippy::cast_possible_truncation)]
            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
                // The backend emits whole-peso floats (e.g. 6000.0).
                if !v.is_finite() {
                    return Err(E::custom("amount is not finite"));
                }
                Ok(Money(v.round() as i64))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
                Money::parse_lenient(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_any(MoneyVisitor)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lenient_formatted() {
        assert_eq!(Money::parse_lenient("$6.990").unwrap(), Money::new(6990));
        assert_eq!(Money::parse_lenient("CLP 6.990").unwrap(), Money::new(6990));
        assert_eq!(Money::parse_lenient("6990").unwrap(), Money::new(6990));
        assert_eq!(Money::parse_lenient("$ 14.300 ").unwrap(), Money::new(14_300));
    }

    #[test]
    fn test_parse_lenient_no_digits() {
        assert!(matches!(
            Money::parse_lenient(""),
            Err(MoneyError::NoDigits(_))
        ));
        assert!(matches!(
            Money::parse_lenient("$"),
            Err(MoneyError::NoDigits(_))
        ));
    }

    #[test]
    fn test_format_clp() {
        assert_eq!(Money::new(0).format_clp(), "$0");
        assert_eq!(Money::new(500).format_clp(), "$500");
        assert_eq!(Money::new(4300).format_clp(), "$4.300");
        assert_eq!(Money::new(14_300).format_clp(), "$14.300");
        assert_eq!(Money::new(1_234_567).format_clp(), "$1.234.567");
        assert_eq!(Money::new(-4300).format_clp(), "-$4.300");
    }

    #[test]
    fn test_times_and_sum() {
        let total: Money = [Money::new(6000).times(3), Money::new(4300)]
            .into_iter()
            .sum();
        assert_eq!(total, Money::new(22_300));
    }

    #[test]
    fn test_saturating_sub() {
        assert_eq!(
            Money::new(14_300).saturating_sub(Money::new(10_000)),
            Money::new(4300)
        );
        assert_eq!(
            Money::new(10_000).saturating_sub(Money::new(14_300)),
            Money::zero()
        );
    }

    #[test]
    fn test_deserialize_number() {
        let m: Money = serde_json::from_str("6000").unwrap();
        assert_eq!(m, Money::new(6000));

        let m: Money = serde_json::from_str("6000.0").unwrap();
        assert_eq!(m, Money::new(6000));
    }

    #[test]
    fn test_deserialize_formatted_string() {
        let m: Money = serde_json::from_str("\"$6.000\"").unwrap();
        assert_eq!(m, Money::new(6000));
    }

    #[test]
    fn test_serialize_plain_integer() {
        let json = serde_json::to_string(&Money::new(6990)).unwrap();
        assert_eq!(json, "6990");
    }

    #[test]
    fn test_display_is_formatted() {
        assert_eq!(format!("{}", Money::new(4300)), "$4.300");
    }
}
