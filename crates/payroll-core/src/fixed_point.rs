//! `PIC 9(5)V99` fixed-point formatting
//!
//! Five integer digits, two implied fractional digits, unsigned. A value is
//! written as `round(value * 100)` zero-padded to seven digits; the decimal
//! point is never written.

use crate::error::FieldError;
use crate::types::{Amount, RoundingMode};

/// Digits in a fixed-point field
pub const FIXED_WIDTH: usize = 7;

/// Implied scale of a fixed-point field
pub const FIXED_SCALE: f64 = 100.0;

/// Largest representable value
pub const MAX_FIXED_VALUE: f64 = 99_999.99;

/// Largest representable value, in cents
pub const MAX_FIXED_CENTS: u32 = 9_999_999;

/// Validate `value` and scale it to integer cents
///
/// # Errors
/// - [`FieldError::NotFinite`] for NaN and infinities
/// - [`FieldError::OutOfRange`] below 0 or above 99999.99
pub fn to_fixed_cents(value: f64, rounding: RoundingMode) -> Result<u32, FieldError> {
    if !value.is_finite() {
        return Err(FieldError::NotFinite { value });
    }
    if !(0.0..=MAX_FIXED_VALUE).contains(&value) {
        return Err(out_of_range(value));
    }

    let scaled = rounding.round(value * FIXED_SCALE);
    if scaled > f64::from(MAX_FIXED_CENTS) {
        return Err(out_of_range(value));
    }

    // In range and integral after rounding
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Ok(scaled as u32)
}

/// Format `value` as a seven-digit implied-decimal field
///
/// # Errors
/// Same as [`to_fixed_cents`].
pub fn format_fixed(value: f64, rounding: RoundingMode) -> Result<String, FieldError> {
    let cents = to_fixed_cents(value, rounding)?;
    Ok(format!("{cents:0width$}", width = FIXED_WIDTH))
}

/// Read a seven-digit implied-decimal field back
///
/// Returns `None` unless `digits` is exactly seven ASCII digits.
#[must_use]
pub fn decode_fixed(digits: &str) -> Option<Amount> {
    if digits.len() != FIXED_WIDTH || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<i64>().ok().map(Amount::from_cents)
}

fn out_of_range(value: f64) -> FieldError {
    FieldError::OutOfRange {
        value,
        min: 0.0,
        max: MAX_FIXED_VALUE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EVEN: RoundingMode = RoundingMode::HalfEven;

    #[test]
    fn test_formats_known_values() {
        assert_eq!(format_fixed(20.0, EVEN).unwrap(), "0002000");
        assert_eq!(format_fixed(15.50, EVEN).unwrap(), "0001550");
        assert_eq!(format_fixed(0.0, EVEN).unwrap(), "0000000");
        assert_eq!(format_fixed(99_999.99, EVEN).unwrap(), "9999999");
        assert_eq!(format_fixed(0.01, EVEN).unwrap(), "0000001");
    }

    #[test]
    fn test_negative_zero_is_zero() {
        assert_eq!(format_fixed(-0.0, EVEN).unwrap(), "0000000");
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(matches!(
            format_fixed(100_000.00, EVEN),
            Err(FieldError::OutOfRange { .. })
        ));
        assert!(matches!(
            format_fixed(-0.01, EVEN),
            Err(FieldError::OutOfRange { .. })
        ));
        assert!(matches!(
            format_fixed(99_999.995, EVEN),
            Err(FieldError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_rejects_non_finite() {
        assert!(matches!(
            format_fixed(f64::NAN, EVEN),
            Err(FieldError::NotFinite { .. })
        ));
        assert!(matches!(
            format_fixed(f64::INFINITY, EVEN),
            Err(FieldError::NotFinite { .. })
        ));
        assert!(matches!(
            format_fixed(f64::NEG_INFINITY, EVEN),
            Err(FieldError::NotFinite { .. })
        ));
    }

    #[test]
    fn test_tie_follows_rounding_mode() {
        // 0.125 * 100 is exactly 12.5 in binary
        assert_eq!(to_fixed_cents(0.125, RoundingMode::HalfEven), Ok(12));
        assert_eq!(to_fixed_cents(0.125, RoundingMode::HalfAwayFromZero), Ok(13));
        // 1.005 is stored just below the tie, both modes round down
        assert_eq!(to_fixed_cents(1.005, RoundingMode::HalfEven), Ok(100));
        assert_eq!(to_fixed_cents(1.005, RoundingMode::HalfAwayFromZero), Ok(100));
    }

    #[test]
    fn test_decode_fixed() {
        assert_eq!(decode_fixed("0001550"), Some(Amount::from_cents(1550)));
        assert_eq!(decode_fixed("9999999"), Some(Amount::from_cents(9_999_999)));
        assert_eq!(decode_fixed("155"), None);
        assert_eq!(decode_fixed("00015.0"), None);
        assert_eq!(decode_fixed("+001550"), None);
    }

    proptest! {
        #[test]
        fn prop_round_trip_matches_rounded_value(value in 0.0f64..=MAX_FIXED_VALUE) {
            for mode in [RoundingMode::HalfEven, RoundingMode::HalfAwayFromZero] {
                let digits = format_fixed(value, mode).unwrap();
                prop_assert_eq!(digits.len(), FIXED_WIDTH);
                let decoded = decode_fixed(&digits).unwrap();
                #[allow(clippy::cast_possible_truncation)]
                let expected = mode.round(value * 100.0) as i64;
                prop_assert_eq!(decoded.cents(), expected);
            }
        }

        #[test]
        fn prop_negative_values_rejected(value in -1.0e9f64..-0.001) {
            prop_assert!(
                matches!(to_fixed_cents(value, EVEN), Err(FieldError::OutOfRange { .. })),
                "negative value accepted"
            );
        }

        #[test]
        fn prop_values_above_max_rejected(value in 100_000.0f64..1.0e12) {
            prop_assert!(
                matches!(to_fixed_cents(value, EVEN), Err(FieldError::OutOfRange { .. })),
                "oversized value accepted"
            );
        }
    }
}
