//! functions for formatting (physical) values in labels and log messages
use num::Zero;

/// Format a value in scientific notation with the given number of decimals.
///
/// The exponent always carries a sign and at least two digits.
///
/// # Example
/// ```
/// use beamprop::utils::unit_format::format_scientific;
///
/// assert_eq!(format_scientific(6.847e-4, 1), "6.8e-04");
/// assert_eq!(format_scientific(1234.0, 2), "1.23e+03");
/// ```
#[must_use]
pub fn format_scientific(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return format!("{value}");
    }
    let formatted = format!("{value:.decimals$e}");
    let Some((mantissa, exponent)) = formatted.split_once('e') else {
        return formatted;
    };
    let exponent: i32 = exponent.parse().unwrap_or_default();
    let sign = if exponent.is_negative() { '-' } else { '+' };
    format!("{mantissa}e{sign}{:02}", exponent.abs())
}

/// Format an axial position for labels using the shortest representation that
/// keeps the value exact (e.g. `0.4`, `1.0`).
///
/// Positions with a decimal exponent below -4 or above 15 are written in scientific notation
/// with a signed exponent of at least two digits (e.g. `1e-05`, `2.5e+16`). Zero is always
/// written as `0.0`.
#[must_use]
pub fn format_position(position: f64) -> String {
    if position.is_zero() {
        return "0.0".into();
    }
    if !position.is_finite() {
        return format!("{position}");
    }
    let shortest = format!("{position:e}");
    let Some((mantissa, exponent)) = shortest.split_once('e') else {
        return shortest;
    };
    let exponent: i32 = exponent.parse().unwrap_or_default();
    if (-4..16).contains(&exponent) {
        let plain = format!("{position}");
        if plain.contains('.') {
            plain
        } else {
            format!("{plain}.0")
        }
    } else {
        let sign = if exponent.is_negative() { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exponent.abs())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn scientific() {
        assert_eq!(format_scientific(0.0, 1), "0.0e+00");
        assert_eq!(format_scientific(6.847e-4, 1), "6.8e-04");
        assert_eq!(format_scientific(1.0e-4, 1), "1.0e-04");
        assert_eq!(format_scientific(-2.5e12, 1), "-2.5e+12");
        assert_eq!(format_scientific(3.0e-123, 0), "3e-123");
        assert_eq!(format_scientific(f64::INFINITY, 1), "inf");
    }
    #[test]
    fn position() {
        assert_eq!(format_position(0.4), "0.4");
        assert_eq!(format_position(1.0), "1.0");
        assert_eq!(format_position(-0.0), "0.0");
        assert_eq!(format_position(-0.125), "-0.125");
        assert_eq!(format_position(12.0), "12.0");
        assert_eq!(format_position(1.0e-4), "0.0001");
    }
    #[test]
    fn position_scientific() {
        assert_eq!(format_position(1.0e-5), "1e-05");
        assert_eq!(format_position(-1.5e-5), "-1.5e-05");
        assert_eq!(format_position(1.0e16), "1e+16");
        assert_eq!(format_position(1.0e15), "1000000000000000.0");
        assert_eq!(format_position(2.5e-123), "2.5e-123");
        assert_eq!(format_position(f64::INFINITY), "inf");
    }
}
