//! Fixed-point size with a per-value display precision.
//!
//! Unsigned counterpart of [`super::price::Price`]: raw u64 at the shared
//! 10^9 scale. Sizes cannot be negative; subtraction below zero fails
//! rather than wrapping.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Sub};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::fixed::{self, FIXED_PRECISION, FIXED_SCALAR};
use crate::errors::{ValueError, ValueResult};

/// Largest representable quantity before scaling.
pub const QUANTITY_MAX: u64 = u64::MAX / FIXED_SCALAR as u64;

/// An order or trade size with up to 9 fractional digits.
#[derive(Debug, Clone, Copy)]
pub struct Quantity {
    raw: u64,
    precision: u8,
}

impl Quantity {
    /// A zero size at precision 0.
    pub const ZERO: Quantity = Quantity { raw: 0, precision: 0 };

    /// Create from a float, rounding half-to-even at `precision`.
    pub fn new(value: f64, precision: u8) -> ValueResult<Self> {
        let raw = fixed::f64_to_raw(value, precision)?;
        Self::from_raw_i128(raw, precision)
    }

    /// Create from a raw value already at the shared 10^9 scale.
    pub fn from_raw(raw: u64, precision: u8) -> ValueResult<Self> {
        fixed::check_precision(precision)?;
        Ok(Self { raw, precision })
    }

    fn from_raw_i128(raw: i128, precision: u8) -> ValueResult<Self> {
        fixed::check_precision(precision)?;
        if raw < 0 {
            return Err(ValueError::OutOfRange(
                "quantity cannot be negative".to_string(),
            ));
        }
        if raw > u64::MAX as i128 {
            return Err(ValueError::OutOfRange(format!(
                "quantity magnitude exceeds {QUANTITY_MAX}"
            )));
        }
        Ok(Self {
            raw: raw as u64,
            precision,
        })
    }

    /// The raw scaled value.
    #[inline(always)]
    pub const fn raw(&self) -> u64 {
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

    /// Checked addition; the result carries the wider precision.
    pub fn checked_add(&self, rhs: Quantity) -> ValueResult<Quantity> {
        let raw = self
            .raw
            .checked_add(rhs.raw)
            .ok_or(ValueError::Overflow("quantity addition"))?;
        Ok(Quantity {
            raw,
            precision: self.precision.max(rhs.precision),
        })
    }

    /// Checked subtraction; going below zero fails.
    pub fn checked_sub(&self, rhs: Quantity) -> ValueResult<Quantity> {
        let raw = self
            .raw
            .checked_sub(rhs.raw)
            .ok_or(ValueError::Overflow("quantity subtraction"))?;
        Ok(Quantity {
            raw,
            precision: self.precision.max(rhs.precision),
        })
    }

    /// Subtraction flooring at zero.
    pub fn saturating_sub(&self, rhs: Quantity) -> Quantity {
        Quantity {
            raw: self.raw.saturating_sub(rhs.raw),
            precision: self.precision.max(rhs.precision),
        }
    }

    pub fn min(self, other: Self) -> Self {
        if other.raw < self.raw {
            other
        } else {
            self
        }
    }

    pub fn max(self, other: Self) -> Self {
        if other.raw > self.raw {
            other
        } else {
            self
        }
    }
}

impl PartialEq for Quantity {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for Quantity {}

impl PartialOrd for Quantity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Quantity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.raw.cmp(&other.raw)
    }
}

impl Hash for Quantity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl Add for Quantity {
    type Output = Quantity;

    fn add(self, rhs: Self) -> Self::Output {
        Quantity {
            raw: self.raw + rhs.raw,
            precision: self.precision.max(rhs.precision),
        }
    }
}

impl Sub for Quantity {
    type Output = Quantity;

    fn sub(self, rhs: Self) -> Self::Output {
        Quantity {
            raw: self.raw - rhs.raw,
            precision: self.precision.max(rhs.precision),
        }
    }
}

impl FromStr for Quantity {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = fixed::parse_decimal_str(s)?;
        Self::from_raw_i128(parsed.raw, parsed.precision)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fixed::format_raw(f, self.raw as i128, self.precision)
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
