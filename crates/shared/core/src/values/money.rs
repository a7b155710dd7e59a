//! Currency-tagged monetary amount.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::currency::Currency;
use super::fixed::{self, FIXED_PRECISION, FIXED_SCALAR};
use super::price::Price;
use super::quantity::Quantity;
use crate::errors::{ValueError, ValueResult};

/// Largest representable amount before scaling.
pub const MONEY_MAX: i64 = i64::MAX / FIXED_SCALAR;

/// A signed amount of one currency.
///
/// The display precision comes from the currency; the raw value is held at
/// the shared 10^9 scale like every other fixed-point value. Combining
/// amounts of different currencies fails rather than coercing.
#[derive(Debug, Clone)]
pub struct Money {
    raw: i64,
    currency: Currency,
}

impl Money {
    /// Create from a float, rounding half-to-even at the currency precision.
    pub fn new(amount: f64, currency: Currency) -> ValueResult<Self> {
        let raw = fixed::f64_to_raw(amount, currency.precision())?;
        if raw > i64::MAX as i128 || raw < i64::MIN as i128 {
            return Err(ValueError::OutOfRange(format!(
                "money magnitude exceeds {MONEY_MAX}"
            )));
        }
        Ok(Self {
            raw: raw as i64,
            currency,
        })
    }

    /// Create from a raw value already at the shared 10^9 scale.
    ///
    /// Trusted path for persistence readers; round-trips exactly.
    pub const fn from_raw(raw: i64, currency: Currency) -> Self {
        Self { raw, currency }
    }

    /// The notional of `price * qty` denominated in `currency`.
    pub fn from_price_qty(price: Price, qty: Quantity, currency: Currency) -> ValueResult<Self> {
        let raw = price.mul_qty(qty);
        if raw > i64::MAX as i128 || raw < i64::MIN as i128 {
            return Err(ValueError::Overflow("price * quantity notional"));
        }
        Ok(Self {
            raw: raw as i64,
            currency,
        })
    }

    /// The raw scaled value.
    #[inline(always)]
    pub const fn raw(&self) -> i64 {
        self.raw
    }

    #[inline]
    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    /// Display precision, taken from the currency.
    #[inline]
    pub fn precision(&self) -> u8 {
        self.currency.precision()
    }

    #[inline(always)]
    pub const fn is_zero(&self) -> bool {
        self.raw == 0
    }

    #[inline(always)]
    pub const fn is_negative(&self) -> bool {
        self.raw < 0
    }

    /// Explicit float projection for analytics; never used for storage.
    #[inline]
    pub fn as_f64(&self) -> f64 {
        self.raw as f64 / FIXED_SCALAR as f64
    }

    /// Exact decimal projection.
    pub fn as_decimal(&self) -> Decimal {
        Decimal::from_i128_with_scale(self.raw as i128, u32::from(FIXED_PRECISION))
            .round_dp(u32::from(self.currency.precision()))
    }

    /// Checked addition; currencies must match.
    pub fn checked_add(&self, rhs: &Money) -> ValueResult<Money> {
        self.check_currency(rhs)?;
        let raw = self
            .raw
            .checked_add(rhs.raw)
            .ok_or(ValueError::Overflow("money addition"))?;
        Ok(Money {
            raw,
            currency: self.currency.clone(),
        })
    }

    /// Checked subtraction; currencies must match.
    pub fn checked_sub(&self, rhs: &Money) -> ValueResult<Money> {
        self.check_currency(rhs)?;
        let raw = self
            .raw
            .checked_sub(rhs.raw)
            .ok_or(ValueError::Overflow("money subtraction"))?;
        Ok(Money {
            raw,
            currency: self.currency.clone(),
        })
    }

    fn check_currency(&self, rhs: &Money) -> ValueResult<()> {
        if self.currency != rhs.currency {
            return Err(ValueError::CurrencyMismatch {
                lhs: self.currency.code().to_string(),
                rhs: rhs.currency.code().to_string(),
            });
        }
        Ok(())
    }
}

impl PartialEq for Money {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw && self.currency == other.currency
    }
}

impl Eq for Money {}

impl PartialOrd for Money {
    /// Amounts of different currencies are unordered.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.currency != other.currency {
            return None;
        }
        Some(self.raw.cmp(&other.raw))
    }
}

impl Hash for Money {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
        self.currency.hash(state);
    }
}

impl FromStr for Money {
    type Err = ValueError;

    /// Parse the display form: `"1234.56 USD"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (amount_str, code) = s
            .trim()
            .split_once(' ')
            .ok_or_else(|| ValueError::Validation(format!("malformed money string: {s:?}")))?;
        let currency: Currency = code.parse()?;
        let parsed = fixed::parse_decimal_str(amount_str)?;
        if parsed.precision > currency.precision() {
            return Err(ValueError::PrecisionMismatch {
                lhs: parsed.precision,
                rhs: currency.precision(),
            });
        }
        if parsed.raw > i64::MAX as i128 || parsed.raw < i64::MIN as i128 {
            return Err(ValueError::OutOfRange(format!(
                "money magnitude exceeds {MONEY_MAX}"
            )));
        }
        Ok(Self {
            raw: parsed.raw as i64,
            currency,
        })
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fixed::format_raw(f, self.raw as i128, self.currency.precision())?;
        write!(f, " {}", self.currency)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
