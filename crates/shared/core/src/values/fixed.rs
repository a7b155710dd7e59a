//! Shared fixed-point scaling.
//!
//! Raw values are always held at the shared scale of 10^9 regardless of the
//! declared precision; the precision only records how many fractional digits
//! the value carries for display and compatibility checks. That makes
//! comparison across precisions a plain integer comparison.

use crate::errors::{ValueError, ValueResult};

/// Maximum number of fractional digits any value can declare.
pub const FIXED_PRECISION: u8 = 9;

/// The shared scalar: raw = value * 10^9.
pub const FIXED_SCALAR: i64 = 1_000_000_000;

/// 10^(9 - precision); the weight of one unit at the declared precision.
pub(crate) const fn precision_weight(precision: u8) -> i64 {
    // precision is validated to 0..=9 before this is called
    const WEIGHTS: [i64; 10] = [
        1_000_000_000,
        100_000_000,
        10_000_000,
        1_000_000,
        100_000,
        10_000,
        1_000,
        100,
        10,
        1,
    ];
    WEIGHTS[precision as usize]
}

pub(crate) fn check_precision(precision: u8) -> ValueResult<()> {
    if precision > FIXED_PRECISION {
        return Err(ValueError::InvalidPrecision(precision));
    }
    Ok(())
}

/// A decimal string parsed to the shared scale.
pub(crate) struct ParsedDecimal {
    /// Scaled value at 10^9; i128 so range checking is left to the caller.
    pub raw: i128,
    /// Count of fractional digits in the input.
    pub precision: u8,
}

/// Parse a plain decimal string ("-123.456") to the shared scale.
///
/// The declared precision is the number of fractional digits; more than 9
/// fails. Exponent notation and anything but ASCII digits, one optional
/// leading sign and one optional dot are rejected.
pub(crate) fn parse_decimal_str(s: &str) -> ValueResult<ParsedDecimal> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(ValueError::Validation("empty decimal string".to_string()));
    }

    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let (int_str, frac_str) = match digits.split_once('.') {
        Some((_, f)) if f.is_empty() => {
            return Err(ValueError::Validation(format!(
                "malformed decimal string: {trimmed:?}"
            )));
        }
        Some((i, f)) => (i, f),
        None => (digits, ""),
    };

    if int_str.is_empty()
        || !int_str.bytes().all(|b| b.is_ascii_digit())
        || !frac_str.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(ValueError::Validation(format!(
            "malformed decimal string: {trimmed:?}"
        )));
    }

    let precision = frac_str.len();
    if precision > FIXED_PRECISION as usize {
        return Err(ValueError::InvalidPrecision(precision as u8));
    }

    let int_part: i128 = int_str
        .parse()
        .map_err(|_| ValueError::OutOfRange(format!("integer part of {trimmed:?}")))?;

    let frac_part: i128 = if frac_str.is_empty() {
        0
    } else {
        let frac: i128 = frac_str
            .parse()
            .map_err(|_| ValueError::OutOfRange(format!("fractional part of {trimmed:?}")))?;
        frac * precision_weight(precision as u8) as i128
    };

    let magnitude = int_part * FIXED_SCALAR as i128 + frac_part;
    Ok(ParsedDecimal {
        raw: if negative { -magnitude } else { magnitude },
        precision: precision as u8,
    })
}

/// Convert a float to the shared scale, rounding half-to-even at `precision`.
pub(crate) fn f64_to_raw(value: f64, precision: u8) -> ValueResult<i128> {
    check_precision(precision)?;
    if !value.is_finite() {
        return Err(ValueError::Validation(format!(
            "non-finite value: {value}"
        )));
    }
    let scaled = (value * 10f64.powi(i32::from(precision))).round_ties_even();
    Ok(scaled as i128 * precision_weight(precision) as i128)
}

/// Render a raw scaled value at the declared precision (no allocation for
/// the fraction weight lookup; precision must already be validated).
pub(crate) fn format_raw(
    f: &mut std::fmt::Formatter<'_>,
    raw: i128,
    precision: u8,
) -> std::fmt::Result {
    let magnitude = raw.unsigned_abs();
    let int_part = magnitude / FIXED_SCALAR as u128;
    let sign = if raw < 0 { "-" } else { "" };
    if precision == 0 {
        return write!(f, "{sign}{int_part}");
    }
    let frac_part = (magnitude % FIXED_SCALAR as u128) / precision_weight(precision) as u128;
    write!(
        f,
        "{sign}{int_part}.{frac_part:0width$}",
        width = precision as usize
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_integer() {
        let parsed = parse_decimal_str("42").unwrap();
        assert_eq!(parsed.raw, 42_000_000_000);
        assert_eq!(parsed.precision, 0);
    }

    #[test]
    fn test_parse_fraction() {
        let parsed = parse_decimal_str("1.23456").unwrap();
        assert_eq!(parsed.raw, 1_234_560_000);
        assert_eq!(parsed.precision, 5);
    }

    #[test]
    fn test_parse_full_precision() {
        let parsed = parse_decimal_str("1.234567890").unwrap();
        assert_eq!(parsed.raw, 1_234_567_890);
        assert_eq!(parsed.precision, 9);
    }

    #[test]
    fn test_parse_negative() {
        let parsed = parse_decimal_str("-0.5").unwrap();
        assert_eq!(parsed.raw, -500_000_000);
        assert_eq!(parsed.precision, 1);
    }

    #[test]
    fn test_parse_rejects_ten_digits() {
        assert!(matches!(
            parse_decimal_str("1.0123456789"),
            Err(ValueError::InvalidPrecision(10))
        ));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for s in ["", ".", ".5", "1.", "1e9", "12a", "1.2.3", "--1"] {
            assert!(parse_decimal_str(s).is_err(), "accepted {s:?}");
        }
    }

    #[test]
    fn test_f64_rounds_half_to_even() {
        // 0.5 ulps land on the even neighbour at the target precision
        assert_eq!(f64_to_raw(1.25, 1).unwrap(), 1_200_000_000);
        assert_eq!(f64_to_raw(1.35, 1).unwrap(), 1_400_000_000);
        assert_eq!(f64_to_raw(2.5, 0).unwrap(), 2_000_000_000);
        assert_eq!(f64_to_raw(3.5, 0).unwrap(), 4_000_000_000);
    }

    #[test]
    fn test_f64_rejects_non_finite() {
        assert!(f64_to_raw(f64::NAN, 2).is_err());
        assert!(f64_to_raw(f64::INFINITY, 2).is_err());
    }
}
