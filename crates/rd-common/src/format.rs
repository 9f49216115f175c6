//! Compact number formatting for heatmap annotations.

/// Format `x` in scientific notation with `precision` digits after the
/// point and an unpadded exponent: `0.0123` becomes `1.23e-2`.
///
/// Non-finite values print as `nan`, `inf` and `-inf`.
pub fn short_e(x: f64, precision: usize) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    // LowerExp never zero-pads the exponent.
    format!("{:.*e}", precision, x)
}

/// `short_e` with one digit of precision, for small figures.
pub fn short_fmt(x: f64) -> String {
    short_e(x, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_small_values() {
        assert_eq!(short_e(0.0123, 2), "1.23e-2");
        assert_eq!(short_e(1.2345, 1), "1.2e0");
        assert_eq!(short_e(12345.0, 2), "1.23e4");
    }

    #[test]
    fn formats_zero_and_negative() {
        assert_eq!(short_e(0.0, 2), "0.00e0");
        assert_eq!(short_e(-0.5, 1), "-5.0e-1");
    }

    #[test]
    fn formats_non_finite() {
        assert_eq!(short_e(f64::NAN, 2), "nan");
        assert_eq!(short_e(f64::INFINITY, 2), "inf");
        assert_eq!(short_e(f64::NEG_INFINITY, 2), "-inf");
    }

    #[test]
    fn short_fmt_uses_one_digit() {
        assert_eq!(short_fmt(0.0123), "1.2e-2");
    }
}
