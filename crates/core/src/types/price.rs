//! Type-safe price representation using decimal arithmetic.
//!
//! All Ferrik prices are in Ukrainian hryvnia. Prices travel as JSON numbers,
//! but menu sheets are hand-edited, so input also accepts strings such as
//! `"120.50 грн"` or `"45,5"`.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul, Sub};
use core::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Currency suffix used when displaying prices.
pub const CURRENCY_SUFFIX: &str = "грн";

/// Errors that can occur when parsing a [`Price`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input could not be read as a decimal number.
    #[error("cannot convert '{0}' to a price")]
    Invalid(String),
    /// The amount is below zero.
    #[error("price cannot be negative: {0}")]
    Negative(Decimal),
}

/// A non-negative amount in hryvnia.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// Zero hryvnia.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if the amount is below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self(amount))
    }

    /// Create a price from a whole number of hryvnia.
    #[must_use]
    pub fn from_hryvnia(amount: u32) -> Self {
        Self(Decimal::from(amount))
    }

    /// Create a price from kopiykas (hundredths of a hryvnia).
    #[must_use]
    pub fn from_kopiykas(kopiykas: u64) -> Self {
        Self(Decimal::from(kopiykas) / Decimal::ONE_HUNDRED)
    }

    /// Parse a loosely formatted price.
    ///
    /// Strips everything except digits, `.`, `,` and `-`, treats `,` as a
    /// decimal separator and keeps only the last `.` when there are several.
    /// An empty result is zero. The amount is rounded half-up to two places.
    ///
    /// # Errors
    ///
    /// Returns an error if the cleaned input is not a number or is negative.
    ///
    /// # Examples
    ///
    /// ```
    /// use ferrik_core::Price;
    ///
    /// assert_eq!(Price::parse_lenient("30 грн").unwrap(), Price::from_hryvnia(30));
    /// assert_eq!(Price::parse_lenient("45,5").unwrap(), Price::from_kopiykas(4550));
    /// assert_eq!(Price::parse_lenient("").unwrap(), Price::ZERO);
    /// assert!(Price::parse_lenient("abc-1-2").is_err());
    /// ```
    pub fn parse_lenient(input: &str) -> Result<Self, PriceError> {
        let cleaned: String = input
            .trim()
            .chars()
            .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-'))
            .map(|c| if c == ',' { '.' } else { c })
            .collect();

        let normalized = match cleaned.rsplit_once('.') {
            Some((whole, fraction)) if whole.contains('.') => {
                format!("{}.{fraction}", whole.replace('.', ""))
            }
            _ => cleaned,
        };

        if normalized.is_empty() || normalized == "." {
            return Ok(Self::ZERO);
        }

        let amount = Decimal::from_str(&normalized)
            .map_err(|_| PriceError::Invalid(input.to_owned()))?;
        Self::new(amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }

    /// Returns the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns true if the price is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Price rounded half-up to whole kopiykas.
    #[must_use]
    pub fn rounded(self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Percentage of this price, rounded half-up to whole kopiykas.
    #[must_use]
    pub fn percent(self, pct: Decimal) -> Self {
        let share = (self.0 * pct / Decimal::ONE_HUNDRED).max(Decimal::ZERO);
        Self(share).rounded()
    }

    /// Subtract, clamping at zero.
    #[must_use]
    pub fn saturating_sub(self, other: Self) -> Self {
        Self((self.0 - other.0).max(Decimal::ZERO))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {CURRENCY_SUFFIX}", self.0)
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_lenient(s)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Price {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self.saturating_sub(rhs)
    }
}

impl Mul<u32> for Price {
    type Output = Self;

    fn mul(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let normalized = self.0.normalize();
        if normalized.scale() == 0
            && let Some(whole) = normalized.to_i64()
        {
            return serializer.serialize_i64(whole);
        }
        match normalized.to_f64() {
            Some(value) => serializer.serialize_f64(value),
            None => Err(serde::ser::Error::custom(format!(
                "price {normalized} is not representable as a number"
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawPrice {
            Number(serde_json::Number),
            Text(String),
        }

        let price = match RawPrice::deserialize(deserializer)? {
            RawPrice::Number(n) => {
                let text = n.to_string();
                let amount = Decimal::from_str(&text)
                    .or_else(|_| Decimal::from_scientific(&text))
                    .map_err(|_| PriceError::Invalid(text))
                    .map_err(<D::Error as serde::de::Error>::custom)?;
                Self::new(amount)
            }
            RawPrice::Text(s) => Self::parse_lenient(&s),
        };
        price.map_err(serde::de::Error::custom)
    }
}
