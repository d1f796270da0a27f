use crate::error::ExecutionError;
use serde::{Deserialize, Serialize};

/// Top-of-book snapshot for one trading pair.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MarketSnapshot {
    /// Dashless pair symbol, eg/ `"BTCUSDT"`.
    pub symbol: String,
    pub best_bid: f64,
    pub best_ask: f64,
    pub bid_volume: f64,
    pub ask_volume: f64,
    pub timestamp: i64,
}

impl MarketSnapshot {
    pub fn new(symbol: &str, best_bid: f64, best_ask: f64) -> Self {
        Self {
            symbol: symbol.to_string(),
            best_bid,
            best_ask,
            bid_volume: 0.0,
            ask_volume: 0.0,
            timestamp: 0,
        }
    }

    pub fn mid_price(&self) -> f64 {
        if self.is_valid() {
            (self.best_bid + self.best_ask) / 2.0
        } else {
            0.0
        }
    }

    /// Spread as a percentage of the ask.
    pub fn spread(&self) -> f64 {
        if self.is_valid() {
            (self.best_ask - self.best_bid) / self.best_ask * 100.0
        } else {
            0.0
        }
    }

    pub fn is_valid(&self) -> bool {
        self.best_bid > 0.0 && self.best_ask > 0.0
    }
}

/// Outcome of evaluating both directions of a triangle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArbitrageResult {
    /// Whether the A->B->C->A direction won.
    pub is_forward_path: bool,
    pub profit_percentage: f64,
    pub start_amount: f64,
    pub end_amount: f64,
    pub profit: f64,
    /// Asset sequence of the winning path.
    pub path: Vec<String>,
}

/// Evaluate a triangular arbitrage across three pairs.
///
/// The forward path buys B with A, buys C with B, then sells C back into A;
/// the reverse path runs the triangle the other way. Each leg pays
/// `fee_percentage` of its output. The more profitable direction is
/// returned, profitable or not.
pub fn triangular_arbitrage(
    data_ab: &MarketSnapshot,
    data_bc: &MarketSnapshot,
    data_ca: &MarketSnapshot,
    start_amount: f64,
    fee_percentage: f64,
) -> Result<ArbitrageResult, ExecutionError> {
    if !(data_ab.is_valid() && data_bc.is_valid() && data_ca.is_valid()) {
        return Err(ExecutionError::InvalidParameter(
            "market snapshots must carry both bid and ask".to_string(),
        ));
    }
    if start_amount <= 0.0 {
        return Err(ExecutionError::InvalidParameter(format!(
            "start amount must be positive: {start_amount}"
        )));
    }

    let keep = 1.0 - fee_percentage / 100.0;
    let symbol_a = asset_prefix(&data_ab.symbol);
    let symbol_b = asset_prefix(&data_bc.symbol);
    let symbol_c = asset_prefix(&data_ca.symbol);

    // Forward: A -> B -> C -> A.
    let amount_b = start_amount / data_ab.best_ask * keep;
    let amount_c = amount_b / data_bc.best_ask * keep;
    let end_forward = amount_c * data_ca.best_bid * keep;
    let forward_pct = (end_forward - start_amount) / start_amount * 100.0;

    // Reverse: A -> C -> B -> A.
    let amount_c_rev = start_amount * data_ca.best_bid * keep;
    let amount_b_rev = amount_c_rev * data_bc.best_bid * keep;
    let end_reverse = amount_b_rev * data_ab.best_bid * keep;
    let reverse_pct = (end_reverse - start_amount) / start_amount * 100.0;

    let is_forward_path = forward_pct > reverse_pct;
    let (end_amount, profit_percentage, path) = if is_forward_path {
        (
            end_forward,
            forward_pct,
            vec![
                symbol_a.clone(),
                symbol_b.clone(),
                symbol_c.clone(),
                symbol_a.clone(),
            ],
        )
    } else {
        (
            end_reverse,
            reverse_pct,
            vec![
                symbol_a.clone(),
                symbol_c.clone(),
                symbol_b.clone(),
                symbol_a.clone(),
            ],
        )
    };

    Ok(ArbitrageResult {
        is_forward_path,
        profit_percentage,
        start_amount,
        end_amount,
        profit: end_amount - start_amount,
        path,
    })
}

/// Base-asset prefix of a dashless pair symbol.
fn asset_prefix(symbol: &str) -> String {
    symbol.chars().take(3).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_derivations() {
        let snapshot = MarketSnapshot::new("BTCUSDT", 30_000.0, 30_001.0);
        assert!(snapshot.is_valid());
        assert_eq!(snapshot.mid_price(), 30_000.5);
        assert!((snapshot.spread() - (1.0 / 30_001.0 * 100.0)).abs() < 1e-12);

        let empty = MarketSnapshot::new("BTCUSDT", 0.0, 30_001.0);
        assert!(!empty.is_valid());
        assert_eq!(empty.mid_price(), 0.0);
    }

    #[test]
    fn evaluates_both_paths_and_picks_the_better() {
        // BTC-USDT, ETH-BTC, ETH-USDT with a visible forward edge.
        let ab = MarketSnapshot::new("BTCUSDT", 30_000.0, 30_001.0);
        let bc = MarketSnapshot::new("ETHBTC", 0.05, 0.0501);
        let ca = MarketSnapshot::new("ETHUSDT", 1_505.0, 1_506.0);

        let result = triangular_arbitrage(&ab, &bc, &ca, 1_000.0, 0.1).unwrap();

        // Forward: 1000 / 30001 -> BTC, / 0.0501 -> ETH, * 1505 -> USDT.
        let keep = 1.0 - 0.1 / 100.0;
        let forward = 1_000.0 / 30_001.0 * keep / 0.0501 * keep * 1_505.0 * keep;
        assert!(result.is_forward_path);
        assert!((result.end_amount - forward).abs() < 1e-9);
        assert!(
            (result.profit_percentage - (forward - 1_000.0) / 1_000.0 * 100.0).abs() < 1e-9
        );
        assert_eq!(result.path, vec!["BTC", "ETH", "ETH", "BTC"]);
        assert_eq!(result.start_amount, 1_000.0);
    }

    #[test]
    fn unprofitable_triangle_still_reports() {
        let ab = MarketSnapshot::new("BTCUSDT", 30_000.0, 30_001.0);
        let bc = MarketSnapshot::new("ETHBTC", 0.05, 0.0501);
        let ca = MarketSnapshot::new("ETHUSDT", 1_490.0, 1_491.0);

        let result = triangular_arbitrage(&ab, &bc, &ca, 1_000.0, 0.35).unwrap();
        assert!(result.profit < 0.0);
        assert!(result.profit_percentage < 0.0);
    }

    #[test]
    fn invalid_snapshot_fails() {
        let good = MarketSnapshot::new("BTCUSDT", 30_000.0, 30_001.0);
        let bad = MarketSnapshot::new("ETHBTC", 0.0, 0.0);
        assert!(triangular_arbitrage(&good, &bad, &good, 1_000.0, 0.1).is_err());
        assert!(triangular_arbitrage(&good, &good, &good, 0.0, 0.1).is_err());
    }
}
