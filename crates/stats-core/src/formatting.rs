/// Fixed-point rendering with comma thousands separators. `NaN` renders as
/// `"NaN"`.
///
/// ```
/// use stats_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5,  1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    let fixed = format!("{:.*}", decimals as usize, round_to(value.abs(), decimals));
    let (whole, fraction) = match fixed.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut out = String::with_capacity(fixed.len() + whole.len() / 3 + 1);
    // "-0.0" is printed without a sign.
    if value < 0.0 && fixed.bytes().any(|b| matches!(b, b'1'..=b'9')) {
        out.push('-');
    }
    out.push_str(&group_thousands(whole));
    if let Some(f) = fraction {
        out.push('.');
        out.push_str(f);
    }
    out
}

/// Round `value` to `decimals` decimal places.  `NaN` stays `NaN`.
///
/// ```
/// use stats_core::formatting::round_to;
///
/// assert_eq!(round_to(33.333, 1), 33.3);
/// assert_eq!(round_to(2.25, 0), 2.0);
/// ```
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Format `value` with an explicit sign: `+` for positive, `-` for negative
/// and no sign when the value rounds to exactly zero.
///
/// ```
/// use stats_core::formatting::format_signed;
///
/// assert_eq!(format_signed(2.46, 1), "+2.5");
/// assert_eq!(format_signed(-0.75, 1), "-0.8");
/// assert_eq!(format_signed(0.0, 1), "0.0");
/// assert_eq!(format_signed(-0.01, 1), "0.0");
/// ```
pub fn format_signed(value: f64, decimals: u32) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    let magnitude = round_to(value.abs(), decimals);
    let digits = format!("{:.prec$}", magnitude, prec = decimals as usize);
    if magnitude == 0.0 {
        digits
    } else if value > 0.0 {
        format!("+{}", digits)
    } else {
        format!("-{}", digits)
    }
}

/// Share of `part` in `whole` as a percentage rounded to `decimal_places`.
/// A zero `whole` gives `0.0`.
///
/// ```
/// use stats_core::formatting::percentage;
///
/// assert!((percentage(50.0, 200.0, 1) - 25.0).abs() < 1e-9);
/// assert_eq!(percentage(0.0, 0.0, 2), 0.0);
/// ```
pub fn percentage(part: f64, whole: f64, decimal_places: u32) -> f64 {
    if whole == 0.0 {
        return 0.0;
    }
    round_to((part / whole) * 100.0, decimal_places)
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number_grouping() {
        assert_eq!(format_number(0.0, 2), "0.00");
        assert_eq!(format_number(999.0, 0), "999");
        assert_eq!(format_number(1_000.0, 0), "1,000");
        assert_eq!(format_number(12_345_678.25, 2), "12,345,678.25");
    }

    #[test]
    fn test_format_number_sign_and_nan() {
        assert_eq!(format_number(-9_876.5, 1), "-9,876.5");
        assert_eq!(format_number(-0.04, 1), "0.0");
        assert_eq!(format_number(f64::NAN, 1), "NaN");
    }

    #[test]
    fn test_format_number_rounds_up_into_next_group() {
        assert_eq!(format_number(999.96, 1), "1,000.0");
    }

    #[test]
    fn test_round_to() {
        assert!((round_to(66.666, 1) - 66.7).abs() < 1e-9);
        assert!((round_to(-12.34, 1) + 12.3).abs() < 1e-9);
        assert!(round_to(f64::NAN, 1).is_nan());
    }

    #[test]
    fn test_format_signed() {
        assert_eq!(format_signed(10.0, 1), "+10.0");
        assert_eq!(format_signed(-3.26, 1), "-3.3");
        assert_eq!(format_signed(f64::NAN, 1), "NaN");
    }

    #[test]
    fn test_format_signed_zero_has_no_sign() {
        assert_eq!(format_signed(0.0, 1), "0.0");
        assert_eq!(format_signed(-0.0, 1), "0.0");
        assert_eq!(format_signed(0.04, 1), "0.0");
    }

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(10.0, 0.0, 2), 0.0);
        let p = percentage(2.0, 3.0, 1);
        assert!((p - 66.7).abs() < 1e-9, "percentage = {p}");
    }
}
