use crate::error::{FinancialReportError, Result};

/// Formats a value as dollars with thousands separators, e.g. `$1,234.56` or `$-80.00`.
pub fn format_currency(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    format!("${}{}", sign, group_thousands(&format!("{:.2}", value.abs())))
}

fn group_thousands(digits: &str) -> String {
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (digits, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(frac) => format!("{}.{}", grouped, frac),
        None => grouped,
    }
}

/// Relative change from `old` to `new` in percent, measured against `|old|`.
/// Returns `None` when `old` is zero.
pub fn percentage_change(old: f64, new: f64) -> Option<f64> {
    if old == 0.0 {
        return None;
    }
    Some((new - old) / old.abs() * 100.0)
}

pub fn format_percentage_change(old: f64, new: f64) -> String {
    match percentage_change(old, new) {
        Some(change) => format!("{:.2}%", change),
        None => "N/A".to_string(),
    }
}

/// Adds up `values`, starting from `0.0` so an empty input is positive zero.
pub fn sum_values<'a>(values: impl IntoIterator<Item = &'a f64>) -> f64 {
    values.into_iter().fold(0.0, |total, value| total + value)
}

/// Division that yields `None` instead of an infinite or undefined ratio.
pub fn safe_div(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        return None;
    }
    let ratio = numerator / denominator;
    ratio.is_finite().then_some(ratio)
}

/// Rejects NaN and infinite totals before they reach a statement.
pub fn ensure_finite(statement: &str, label: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(FinancialReportError::Computation {
            statement: statement.to_string(),
            details: format!("{} is not a finite number ({})", label, value),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(999.5), "$999.50");
        assert_eq!(format_currency(1234.567), "$1,234.57");
        assert_eq!(format_currency(1_000_000.0), "$1,000,000.00");
        assert_eq!(format_currency(-2500.0), "$-2,500.00");
    }

    #[test]
    fn test_percentage_change() {
        assert_eq!(percentage_change(0.0, 10.0), None);
        assert_eq!(percentage_change(200.0, 300.0), Some(50.0));
        assert_eq!(percentage_change(-100.0, -50.0), Some(50.0));
        assert_eq!(format_percentage_change(80.0, 90.0), "12.50%");
        assert_eq!(format_percentage_change(0.0, 90.0), "N/A");
    }

    #[test]
    fn test_sum_values_of_nothing_is_positive_zero() {
        let empty: Vec<f64> = Vec::new();
        let total = sum_values(&empty);
        assert_eq!(total, 0.0);
        assert!(total.is_sign_positive());
        assert_eq!(format!("{:.2}", total), "0.00");

        assert_eq!(sum_values(&[1.5, -0.5, 2.0]), 3.0);
    }

    #[test]
    fn test_safe_div() {
        assert_eq!(safe_div(10.0, 0.0), None);
        assert_eq!(safe_div(10.0, 4.0), Some(2.5));
        assert_eq!(safe_div(f64::MAX, f64::MIN_POSITIVE), None);
    }

    #[test]
    fn test_ensure_finite() {
        assert_eq!(ensure_finite("balance sheet", "total", 5.0).unwrap(), 5.0);
        assert!(ensure_finite("balance sheet", "total", f64::INFINITY).is_err());
        assert!(ensure_finite("balance sheet", "total", f64::NAN).is_err());
    }
}
