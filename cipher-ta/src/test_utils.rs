//! Synthetic candle generators for tests and examples.

use crate::CandleRow;
use rand::Rng;

/// Build one candle from a close price, with a plausible random range.
pub fn fake_candle(timestamp: i64, close: f64) -> CandleRow {
    let mut rng = rand::rng();
    let spread = close.abs().max(1.0) * 0.01;
    let open = close + rng.random_range(-spread..spread);
    let high = open.max(close) + rng.random_range(0.0..spread);
    let low = open.min(close) - rng.random_range(0.0..spread);
    let volume = rng.random_range(1.0..1_000.0);
    [timestamp as f64, open, close, high, low, volume]
}

/// Candles walking through the given close prices, one minute apart.
pub fn candles_from_close_prices(prices: &[f64]) -> Vec<CandleRow> {
    prices
        .iter()
        .enumerate()
        .map(|(i, &close)| fake_candle(i as i64 * 60_000, close))
        .collect()
}

/// A random-walk series of `count` candles, one minute apart.
pub fn generate_range_candles(count: usize) -> Vec<CandleRow> {
    let mut rng = rand::rng();
    let mut close = 100.0;
    (0..count)
        .map(|i| {
            close *= 1.0 + rng.random_range(-0.01..0.01);
            fake_candle(i as i64 * 60_000, close)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_candles_hold_ohlc_invariants() {
        for row in generate_range_candles(200) {
            let (open, close, high, low, volume) = (row[1], row[2], row[3], row[4], row[5]);
            assert!(low <= open.min(close));
            assert!(high >= open.max(close));
            assert!(volume >= 0.0);
        }
    }

    #[test]
    fn timestamps_step_one_minute() {
        let candles = generate_range_candles(5);
        for pair in candles.windows(2) {
            assert_eq!(pair[1][0] - pair[0][0], 60_000.0);
        }
    }
}
