//! Number coercion and display formatting
//!
//! The backend emits every numeric value as a string, so anything headed for
//! arithmetic or display goes through `to_number` first.

use serde_json::Value;

/// Numeric value of a raw cell; null, non-numeric and non-finite values are 0
pub fn to_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()).unwrap_or(0.0),
        Value::String(s) => parse_number(s).unwrap_or(0.0),
        Value::Bool(b) => f64::from(u8::from(*b)),
        _ => 0.0,
    }
}

/// Strict parse of a numeric string (surrounding whitespace allowed)
pub fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|f| f.is_finite())
}

/// `$1,234,568` (whole dollars)
pub fn format_currency(value: f64) -> String {
    with_sign(value, 0, |digits| format!("${digits}"))
}

/// `$1.2B`, `$3.4M`, `$45.3K`, `$950`
pub fn format_currency_compact(value: f64) -> String {
    let abs = value.abs();
    let (scaled, suffix) = if abs >= 1e9 {
        (value / 1e9, "B")
    } else if abs >= 1e6 {
        (value / 1e6, "M")
    } else if abs >= 1e3 {
        (value / 1e3, "K")
    } else {
        return format_currency(value);
    };
    with_sign(scaled, 1, |digits| format!("${digits}{suffix}"))
}

/// `12.3%` for a value already expressed in percent
pub fn format_percent(value: f64, decimals: usize) -> String {
    format!("{}%", format_number(value, decimals))
}

/// `1,234` (rounded to a whole count)
pub fn format_count(value: f64) -> String {
    format_number(value, 0)
}

/// Thousands-grouped fixed-point number
pub fn format_number(value: f64, decimals: usize) -> String {
    with_sign(value, decimals, |digits| digits.to_string())
}

fn with_sign(value: f64, decimals: usize, wrap: impl FnOnce(&str) -> String) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (fixed.as_str(), None),
    };

    let mut digits = group_thousands(int_part);
    if let Some(frac) = frac_part {
        digits.push('.');
        digits.push_str(frac);
    }

    // -0.04 rounds to "0.0" and must not keep its sign
    let is_zero = fixed.chars().all(|c| c == '0' || c == '.');
    if value < 0.0 && !is_zero {
        format!("-{}", wrap(&digits))
    } else {
        wrap(&digits)
    }
}

fn group_thousands(int_part: &str) -> String {
    let len = int_part.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_to_number_coerces_backend_strings() {
        assert_eq!(to_number(&json!("1250.75")), 1250.75);
        assert_eq!(to_number(&json!(" 42 ")), 42.0);
        assert_eq!(to_number(&json!(7)), 7.0);
        assert_eq!(to_number(&json!(null)), 0.0);
        assert_eq!(to_number(&json!("NaN")), 0.0);
        assert_eq!(to_number(&json!("n/a")), 0.0);
        assert_eq!(to_number(&json!({"x": 1})), 0.0);
    }

    #[test]
    fn test_currency() {
        assert_eq!(format_currency(1234567.89), "$1,234,568");
        assert_eq!(format_currency(0.0), "$0");
        assert_eq!(format_currency(-950.2), "-$950");
        assert_eq!(format_currency(999.5), "$1,000");
    }

    #[test]
    fn test_compact_currency() {
        assert_eq!(format_currency_compact(1_500_000_000.0), "$1.5B");
        assert_eq!(format_currency_compact(3_420_000.0), "$3.4M");
        assert_eq!(format_currency_compact(45_300.0), "$45.3K");
        assert_eq!(format_currency_compact(950.0), "$950");
        assert_eq!(format_currency_compact(-2_000_000.0), "-$2.0M");
    }

    #[test]
    fn test_percent_and_count() {
        assert_eq!(format_percent(12.345, 1), "12.3%");
        assert_eq!(format_percent(-0.04, 1), "0.0%");
        assert_eq!(format_count(1234.4), "1,234");
        assert_eq!(format_count(12.0), "12");
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
    }
}
