use crate::error::InstrumentError;
use rust_decimal::{Decimal, prelude::FromPrimitive, prelude::ToPrimitive};

/// Add two amounts without accumulating binary-float drift.
///
/// Balance mutations route through these so that long submission /
/// execution / cancellation sequences restore balances exactly.
pub fn add(a: f64, b: f64) -> f64 {
    match (Decimal::from_f64(a), Decimal::from_f64(b)) {
        (Some(da), Some(db)) => (da + db).to_f64().unwrap_or(a + b),
        _ => a + b,
    }
}

/// Subtract `b` from `a` with decimal precision.
pub fn sub(a: f64, b: f64) -> f64 {
    match (Decimal::from_f64(a), Decimal::from_f64(b)) {
        (Some(da), Some(db)) => (da - db).to_f64().unwrap_or(a - b),
        _ => a - b,
    }
}

/// Multiply with decimal precision.
pub fn mul(a: f64, b: f64) -> f64 {
    match (Decimal::from_f64(a), Decimal::from_f64(b)) {
        (Some(da), Some(db)) => (da * db).to_f64().unwrap_or(a * b),
        _ => a * b,
    }
}

/// Floor `num` at `precision` decimal places.
pub fn floor_with_precision(num: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    (num * factor).floor() / factor
}

/// Round, passing `None` through.
pub fn round_or_none(x: Option<f64>, digits: u32) -> Option<f64> {
    let factor = 10f64.powi(digits as i32);
    x.map(|v| (v * factor).round() / factor)
}

/// Round a price for submission to a live venue.
pub fn round_price_for_live_mode(price: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    (price * factor).round() / factor
}

/// Floor a quantity for submission to a live venue.
///
/// Quantities that round to zero cannot be transmitted.
pub fn round_qty_for_live_mode(qty: f64, precision: u32) -> Result<f64, InstrumentError> {
    let rounded = round_decimals_down(qty, precision);
    if rounded == 0.0 {
        return Err(InstrumentError::InvalidParameter(format!(
            "quantity is too small: {qty}"
        )));
    }
    Ok(rounded)
}

/// Truncate toward zero at `decimals` places.
pub fn round_decimals_down(number: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (number * factor).floor() / factor
}

/// Format with US-locale thousands separators, eg/ `1234567.891` ->
/// `"1,234,567.89"`.
pub fn format_currency(num: f64) -> String {
    let negative = num < 0.0;
    let rounded = (num.abs() * 100.0).round() / 100.0;
    let whole = rounded.trunc() as i64;
    let cents = ((rounded - rounded.trunc()) * 100.0).round() as i64;

    let digits = whole.to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    format!(
        "{}{}.{:02}",
        if negative { "-" } else { "" },
        grouped,
        cents
    )
}

/// Linearly map `old_value` from `[old_min, old_max]` onto
/// `[new_min, new_max]`.
pub fn scale_to_range(old_max: f64, old_min: f64, new_max: f64, new_min: f64, old_value: f64) -> f64 {
    (old_value - old_min) / (old_max - old_min) * (new_max - new_min) + new_min
}

/// Normalize `x` into `[0, 1]` over `[x_min, x_max]`.
pub fn normalize(x: f64, x_min: f64, x_max: f64) -> f64 {
    (x - x_min) / (x_max - x_min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_add_sub_is_exact() {
        // 0.1 + 0.2 famously != 0.3 in raw f64.
        assert_eq!(add(0.1, 0.2), 0.3);
        assert_eq!(sub(0.3, 0.1), 0.2);
        assert_eq!(sub(10_000.0, 5_000.0), 5_000.0);
        assert_eq!(mul(1.0, 0.999), 0.999);
    }

    #[test]
    fn non_finite_falls_back() {
        assert!(add(f64::NAN, 1.0).is_nan());
        assert_eq!(add(f64::INFINITY, 1.0), f64::INFINITY);
    }

    #[test]
    fn floor_and_truncate() {
        assert_eq!(floor_with_precision(1.239, 2), 1.23);
        assert_eq!(round_decimals_down(1.999, 2), 1.99);
        assert_eq!(round_price_for_live_mode(1.2349, 3), 1.235);
    }

    #[test]
    fn tiny_qty_rejected() {
        assert!(round_qty_for_live_mode(0.0001, 2).is_err());
        assert_eq!(round_qty_for_live_mode(1.239, 2).unwrap(), 1.23);
    }

    #[test]
    fn currency_formatting() {
        assert_eq!(format_currency(1_234_567.891), "1,234,567.89");
        assert_eq!(format_currency(999.5), "999.50");
        assert_eq!(format_currency(-1_000.0), "-1,000.00");
    }

    #[test]
    fn scaling() {
        assert_eq!(scale_to_range(10.0, 0.0, 1.0, 0.0, 5.0), 0.5);
        assert_eq!(normalize(5.0, 0.0, 10.0), 0.5);
    }
}
