use crate::{
    CandleRow,
    error::{IndicatorError, check_len, check_period},
    helpers,
    slice::{sequential_or_last, slice_candles},
    source::{CandleSource, candle_source},
};

/// Accumulation/Distribution line: cumulative money-flow volume.
pub fn ad(candles: &[CandleRow], sequential: bool) -> Result<Vec<f64>, IndicatorError> {
    let candles = slice_candles(candles, sequential);
    check_len(candles.len(), 1)?;

    let mut line = Vec::with_capacity(candles.len());
    let mut acc = 0.0;
    for row in candles {
        let (close, high, low, volume) = (row[2], row[3], row[4], row[5]);
        let range = high - low;
        let multiplier = if range.abs() > f64::EPSILON {
            ((close - low) - (high - close)) / range
        } else {
            0.0
        };
        acc += multiplier * volume;
        line.push(acc);
    }
    Ok(sequential_or_last(line, sequential))
}

/// Chaikin A/D Oscillator: fast EMA of the A/D line minus slow EMA.
pub fn adosc(
    candles: &[CandleRow],
    fast_period: usize,
    slow_period: usize,
    sequential: bool,
) -> Result<Vec<f64>, IndicatorError> {
    check_period(fast_period)?;
    check_period(slow_period)?;
    if fast_period >= slow_period {
        return Err(IndicatorError::InvalidParameter(format!(
            "fast period {fast_period} must be shorter than slow period {slow_period}"
        )));
    }
    let candles = slice_candles(candles, sequential);
    check_len(candles.len(), slow_period)?;

    let line = ad(candles, true)?;
    let result = helpers::ema(&line, fast_period)
        .iter()
        .zip(&helpers::ema(&line, slow_period))
        .map(|(fast, slow)| fast - slow)
        .collect();
    Ok(sequential_or_last(result, sequential))
}

/// Average price per bar: `(open + high + low + close) / 4`.
pub fn avgprice(candles: &[CandleRow], sequential: bool) -> Result<Vec<f64>, IndicatorError> {
    let candles = slice_candles(candles, sequential);
    check_len(candles.len(), 1)?;
    Ok(sequential_or_last(
        candle_source(candles, CandleSource::Ohlc4),
        sequential,
    ))
}
