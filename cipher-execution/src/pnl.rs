use crate::error::ExecutionError;
use cipher_instrument::TradeType;

/// Realized PNL of a round trip, fee-aware.
///
/// Fees are charged on both legs: `fee_rate * |qty| * (entry + exit)`.
pub fn estimate_pnl(
    qty: f64,
    entry_price: f64,
    exit_price: f64,
    trade_type: TradeType,
    fee_rate: f64,
) -> Result<f64, ExecutionError> {
    let qty = qty.abs();
    if qty == 0.0 {
        return Err(ExecutionError::InvalidParameter(
            "quantity cannot be zero".to_string(),
        ));
    }

    let direction = match trade_type {
        TradeType::Long => 1.0,
        TradeType::Short => -1.0,
    };
    let profit = qty * (exit_price - entry_price) * direction;
    let fee = if fee_rate > 0.0 {
        fee_rate * qty * (entry_price + exit_price)
    } else {
        0.0
    };
    Ok(profit - fee)
}

/// PNL as a percentage of the initial investment `|qty| * entry_price`.
pub fn estimate_pnl_percentage(
    qty: f64,
    entry_price: f64,
    exit_price: f64,
    trade_type: TradeType,
) -> Result<f64, ExecutionError> {
    let qty = qty.abs();
    if qty == 0.0 {
        return Err(ExecutionError::InvalidParameter(
            "quantity cannot be zero".to_string(),
        ));
    }
    let initial_investment = qty * entry_price;
    if initial_investment == 0.0 {
        return Err(ExecutionError::InvalidParameter(
            "initial investment (qty * entry_price) cannot be zero".to_string(),
        ));
    }

    let pnl = estimate_pnl(qty, entry_price, exit_price, trade_type, 0.0)?;
    Ok(pnl / initial_investment * 100.0)
}

/// Quantity-weighted average entry after adding `order_qty @ order_price` to
/// `current_qty @ current_entry_price`. Quantities weigh by magnitude.
pub fn estimate_average_price(
    order_qty: f64,
    order_price: f64,
    current_qty: f64,
    current_entry_price: f64,
) -> Result<f64, ExecutionError> {
    let abs_order_qty = order_qty.abs();
    let abs_current_qty = current_qty.abs();
    let total_qty = abs_order_qty + abs_current_qty;
    if total_qty == 0.0 {
        return Err(ExecutionError::InvalidParameter(
            "total quantity cannot be zero".to_string(),
        ));
    }

    Ok((abs_order_qty * order_price + abs_current_qty * current_entry_price) / total_qty)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_pnl() {
        assert_eq!(
            estimate_pnl(2.0, 50.0, 60.0, TradeType::Long, 0.0).unwrap(),
            20.0
        );
        assert_eq!(
            estimate_pnl(2.0, 60.0, 50.0, TradeType::Long, 0.0).unwrap(),
            -20.0
        );
    }

    #[test]
    fn short_pnl() {
        assert_eq!(
            estimate_pnl(2.0, 60.0, 50.0, TradeType::Short, 0.0).unwrap(),
            20.0
        );
        assert_eq!(
            estimate_pnl(2.0, 50.0, 60.0, TradeType::Short, 0.0).unwrap(),
            -20.0
        );
    }

    #[test]
    fn fee_charged_on_both_legs() {
        // profit 20, fee 0.001 * 2 * 110 = 0.22
        let pnl = estimate_pnl(2.0, 50.0, 60.0, TradeType::Long, 0.001).unwrap();
        assert!((pnl - 19.78).abs() < 1e-12);
    }

    #[test]
    fn negative_qty_uses_magnitude() {
        assert_eq!(
            estimate_pnl(-2.0, 50.0, 60.0, TradeType::Long, 0.0).unwrap(),
            20.0
        );
    }

    #[test]
    fn zero_qty_fails() {
        assert!(estimate_pnl(0.0, 50.0, 60.0, TradeType::Long, 0.0).is_err());
        assert!(estimate_pnl_percentage(0.0, 50.0, 60.0, TradeType::Long).is_err());
    }

    #[test]
    fn pnl_percentage() {
        assert_eq!(
            estimate_pnl_percentage(2.0, 50.0, 60.0, TradeType::Long).unwrap(),
            20.0
        );
        assert_eq!(
            estimate_pnl_percentage(2.0, 50.0, 60.0, TradeType::Short).unwrap(),
            -20.0
        );
        assert!(estimate_pnl_percentage(2.0, 0.0, 60.0, TradeType::Long).is_err());
    }

    #[test]
    fn average_price_weights_by_magnitude() {
        assert_eq!(
            estimate_average_price(1.0, 100.0, 1.0, 200.0).unwrap(),
            150.0
        );
        assert_eq!(
            estimate_average_price(3.0, 100.0, 1.0, 200.0).unwrap(),
            125.0
        );
        assert_eq!(
            estimate_average_price(-1.0, 100.0, -3.0, 200.0).unwrap(),
            175.0
        );
        assert!(estimate_average_price(0.0, 100.0, 0.0, 200.0).is_err());
        // A fresh position averages to the fill price.
        assert_eq!(estimate_average_price(2.0, 100.0, 0.0, 0.0).unwrap(), 100.0);
    }
}
