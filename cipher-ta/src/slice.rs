use crate::CandleRow;

/// Rows a non-sequential call computes over.
///
/// Matches the default warmup-candle count: trimming bounds the work of a
/// per-tick indicator call without changing its newest value.
pub const WARMUP_CANDLES: usize = 240;

/// Trim `candles` for a non-sequential call; sequential calls see everything.
pub fn slice_candles(candles: &[CandleRow], sequential: bool) -> &[CandleRow] {
    if !sequential && candles.len() > WARMUP_CANDLES {
        &candles[candles.len() - WARMUP_CANDLES..]
    } else {
        candles
    }
}

/// Reduce a sequential series to its last value when `sequential` is off.
pub fn sequential_or_last(values: Vec<f64>, sequential: bool) -> Vec<f64> {
    if sequential || values.is_empty() {
        values
    } else {
        vec![values[values.len() - 1]]
    }
}
