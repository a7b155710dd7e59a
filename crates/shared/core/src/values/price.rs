//! Fixed-point price with a per-value display precision.
//!
//! Internally stored as i64 at the shared 10^9 scale:
//! actual_price = raw / 1_000_000_000
//!
//! Example: "1.23456" is stored as raw 1_234_560_000 with precision 5.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Neg, Sub};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::fixed::{self, FIXED_PRECISION, FIXED_SCALAR};
use super::quantity::Quantity;
use crate::errors::{ValueError, ValueResult};

/// Largest representable price before scaling.
pub const PRICE_MAX: i64 = i64::MAX / FIXED_SCALAR;

/// Smallest representable price before scaling.
pub const PRICE_MIN: i64 = -PRICE_MAX;

/// A price with up to 9 fractional digits.
///
/// Equality, ordering and hashing use the raw scaled integer only; because
/// every value shares one scalar, widening across precisions is the
/// identity and `1.50 == 1.5`. Precision is carried for display and for
/// precision-compatibility checks in event constructors.
#[derive(Debug, Clone, Copy)]
pub struct Price {
    raw: i64,
    precision: u8,
}

impl Price {
    /// A zero price at precision 0.
    pub const ZERO: Price = Price { raw: 0, precision: 0 };

    /// Create from a float, rounding half-to-even at `precision`.
    pub fn new(value: f64, precision: u8) -> ValueResult<Self> {
        let raw = fixed::f64_to_raw(value, precision)?;
        Self::from_raw_i128(raw, precision)
    }

    /// Create from a raw value already at the shared 10^9 scale.
    pub fn from_raw(raw: i64, precision: u8) -> ValueResult<Self> {
        fixed::check_precision(precision)?;
        Ok(Self { raw, precision })
    }

    fn from_raw_i128(raw: i128, precision: u8) -> ValueResult<Self> {
        fixed::check_precision(precision)?;
        if raw > i64::MAX as i128 || raw < i64::MIN as i128 {
            return Err(ValueError::OutOfRange(format!(
                "price magnitude exceeds {PRICE_MAX}"
            )));
        }
        Ok(Self {
            raw: raw as i64,
            precision,
        })
    }

    /// The raw scaled value.
    #[inline(always)]
    pub const fn raw(&self) -> i64 {
        self.raw
    }

    /// Count of declared fractional digits.
    #[inline(always)]
    pub const fn precision(&self) -> u8 {
        self.precision
    }

    #[inline(always)]
    pub const fn is_zero(&self) -> bool {
        self.raw == 0
    }

    #[inline(always)]
    pub const fn is_positive(&self) -> bool {
        self.raw > 0
    }

    /// Explicit float projection for analytics; never used for storage.
    #[inline]
    pub fn as_f64(&self) -> f64 {
        self.raw as f64 / FIXED_SCALAR as f64
    }

    /// Exact decimal projection.
    pub fn as_decimal(&self) -> Decimal {
        Decimal::from_i128_with_scale(self.raw as i128, u32::from(FIXED_PRECISION))
            .round_dp(u32::from(self.precision))
    }

    /// Create from an exact decimal; the decimal's scale becomes the
    /// declared precision.
    pub fn from_decimal(value: Decimal) -> ValueResult<Self> {
        let scale = value.scale();
        if scale > u32::from(FIXED_PRECISION) {
            return Err(ValueError::InvalidPrecision(scale as u8));
        }
        let raw = value.mantissa() * fixed::precision_weight(scale as u8) as i128;
        Self::from_raw_i128(raw, scale as u8)
    }

    /// Checked addition; the result carries the wider precision.
    pub fn checked_add(&self, rhs: Price) -> ValueResult<Price> {
        let raw = self
            .raw
            .checked_add(rhs.raw)
            .ok_or(ValueError::Overflow("price addition"))?;
        Ok(Price {
            raw,
            precision: self.precision.max(rhs.precision),
        })
    }

    /// Checked subtraction; the result carries the wider precision.
    pub fn checked_sub(&self, rhs: Price) -> ValueResult<Price> {
        let raw = self
            .raw
            .checked_sub(rhs.raw)
            .ok_or(ValueError::Overflow("price subtraction"))?;
        Ok(Price {
            raw,
            precision: self.precision.max(rhs.precision),
        })
    }

    /// Multiply by a quantity, producing a raw value at the shared scale.
    ///
    /// The product stays an i128; wrap it through [`crate::values::Money`]
    /// or a constructor to get a typed value back.
    #[inline]
    pub const fn mul_qty(&self, qty: Quantity) -> i128 {
        (self.raw as i128 * qty.raw() as i128) / FIXED_SCALAR as i128
    }
}

impl PartialEq for Price {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for Price {}

impl PartialOrd for Price {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Price {
    fn cmp(&self, other: &Self) -> Ordering {
        self.raw.cmp(&other.raw)
    }
}

impl Hash for Price {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl Add for Price {
    type Output = Price;

    fn add(self, rhs: Self) -> Self::Output {
        Price {
            raw: self.raw + rhs.raw,
            precision: self.precision.max(rhs.precision),
        }
    }
}

impl Sub for Price {
    type Output = Price;

    fn sub(self, rhs: Self) -> Self::Output {
        Price {
            raw: self.raw - rhs.raw,
            precision: self.precision.max(rhs.precision),
        }
    }
}

impl Neg for Price {
    type Output = Price;

    fn neg(self) -> Self::Output {
        Price {
            raw: -self.raw,
            precision: self.precision,
        }
    }
}

impl FromStr for Price {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = fixed::parse_decimal_str(s)?;
        Self::from_raw_i128(parsed.raw, parsed.precision)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fixed::format_raw(f, self.raw as i128, self.precision)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
