use crate::{
    CandleRow,
    error::{IndicatorError, check_len, check_period},
    helpers,
    slice::{sequential_or_last, slice_candles},
    source::{CandleSource, candle_source},
};

/// Bill Williams Alligator: three smoothed averages of the median price,
/// each displaced into the future.
#[derive(Debug, Clone, PartialEq)]
pub struct Alligator {
    /// SMMA(13) shifted 8 bars.
    pub jaw: Vec<f64>,
    /// SMMA(8) shifted 5 bars.
    pub teeth: Vec<f64>,
    /// SMMA(5) shifted 3 bars.
    pub lips: Vec<f64>,
}

pub fn alligator(
    candles: &[CandleRow],
    source: CandleSource,
    sequential: bool,
) -> Result<Alligator, IndicatorError> {
    let candles = slice_candles(candles, sequential);
    check_len(candles.len(), 13 + 8)?;
    let src = candle_source(candles, source);

    let jaw = helpers::shift(&helpers::smma(&src, 13), 8);
    let teeth = helpers::shift(&helpers::smma(&src, 8), 5);
    let lips = helpers::shift(&helpers::smma(&src, 5), 3);

    Ok(Alligator {
        jaw: sequential_or_last(jaw, sequential),
        teeth: sequential_or_last(teeth, sequential),
        lips: sequential_or_last(lips, sequential),
    })
}

/// Arnaud Legoux Moving Average: Gaussian-weighted window with `sigma`
/// smoothness and `distribution_offset` skew toward recency.
pub fn alma(
    candles: &[CandleRow],
    period: usize,
    sigma: f64,
    distribution_offset: f64,
    source: CandleSource,
    sequential: bool,
) -> Result<Vec<f64>, IndicatorError> {
    check_period(period)?;
    if sigma <= 0.0 {
        return Err(IndicatorError::InvalidParameter(format!(
            "sigma must be positive: {sigma}"
        )));
    }
    let candles = slice_candles(candles, sequential);
    check_len(candles.len(), period)?;
    let src = candle_source(candles, source);

    let m = distribution_offset * (period as f64 - 1.0);
    let s = period as f64 / sigma;
    let weights: Vec<f64> = (0..period)
        .map(|i| (-((i as f64 - m) * (i as f64 - m)) / (2.0 * s * s)).exp())
        .collect();
    let norm: f64 = weights.iter().sum();

    let mut result = vec![f64::NAN; src.len()];
    for (i, window) in src.windows(period).enumerate() {
        let weighted: f64 = window.iter().zip(&weights).map(|(v, w)| v * w).sum();
        result[i + period - 1] = weighted / norm;
    }
    Ok(sequential_or_last(result, sequential))
}

/// Cubic Weighted Moving Average: weights proportional to the cube of each
/// position's recency.
pub fn cwma(
    candles: &[CandleRow],
    period: usize,
    source: CandleSource,
    sequential: bool,
) -> Result<Vec<f64>, IndicatorError> {
    check_period(period)?;
    let candles = slice_candles(candles, sequential);
    check_len(candles.len(), period)?;
    let src = candle_source(candles, source);

    // Oldest position weighs 1^3, newest weighs period^3.
    let weights: Vec<f64> = (1..=period).map(|i| (i * i * i) as f64).collect();
    let norm: f64 = weights.iter().sum();

    let mut result = vec![f64::NAN; src.len()];
    for (i, window) in src.windows(period).enumerate() {
        let weighted: f64 = window.iter().zip(&weights).map(|(v, w)| v * w).sum();
        result[i + period - 1] = weighted / norm;
    }
    Ok(sequential_or_last(result, sequential))
}

/// Double EMA: `2 * EMA(src, p) - EMA(EMA(src, p), p)`.
pub fn dema(
    candles: &[CandleRow],
    period: usize,
    source: CandleSource,
    sequential: bool,
) -> Result<Vec<f64>, IndicatorError> {
    check_period(period)?;
    let candles = slice_candles(candles, sequential);
    check_len(candles.len(), period)?;
    let src = candle_source(candles, source);

    let ema1 = helpers::ema(&src, period);
    let ema2 = helpers::ema(&ema1, period);
    let result = ema1
        .iter()
        .zip(&ema2)
        .map(|(a, b)| 2.0 * a - b)
        .collect();
    Ok(sequential_or_last(result, sequential))
}

/// Ehlers Distance Coefficient Filter: distance-squared weighted smoothing.
pub fn edcf(
    candles: &[CandleRow],
    period: usize,
    source: CandleSource,
    sequential: bool,
) -> Result<Vec<f64>, IndicatorError> {
    check_period(period)?;
    let candles = slice_candles(candles, sequential);
    check_len(candles.len(), 2 * period)?;
    let src = candle_source(candles, source);

    let mut result = vec![f64::NAN; src.len()];
    for i in (2 * period - 1)..src.len() {
        let mut num = 0.0;
        let mut coef_sum = 0.0;
        for count in 0..period {
            let value = src[i - count];
            let mut distance = 0.0;
            for lookback in 1..period {
                let diff = value - src[i - count - lookback];
                distance += diff * diff;
            }
            num += distance * value;
            coef_sum += distance;
        }
        if coef_sum != 0.0 {
            result[i] = num / coef_sum;
        }
    }
    Ok(sequential_or_last(result, sequential))
}

/// Exponential Moving Average over the selected candle source.
pub fn ema(
    candles: &[CandleRow],
    period: usize,
    source: CandleSource,
    sequential: bool,
) -> Result<Vec<f64>, IndicatorError> {
    check_period(period)?;
    let candles = slice_candles(candles, sequential);
    check_len(candles.len(), period)?;
    let src = candle_source(candles, source);
    Ok(sequential_or_last(helpers::ema(&src, period), sequential))
}

/// End Point Moving Average: linearly weighted toward the window end, with
/// `offset` tilting the weight line (positions past the pivot weigh
/// negative).
pub fn epma(
    candles: &[CandleRow],
    period: usize,
    offset: usize,
    source: CandleSource,
    sequential: bool,
) -> Result<Vec<f64>, IndicatorError> {
    check_period(period)?;
    if period < 2 {
        return Err(IndicatorError::InvalidParameter(
            "period must be at least 2".to_string(),
        ));
    }
    let candles = slice_candles(candles, sequential);
    check_len(candles.len(), period + offset + 1)?;
    let src = candle_source(candles, source);

    let weights: Vec<f64> = (0..period - 1)
        .map(|i| period as f64 - i as f64 - offset as f64)
        .collect();
    let norm: f64 = weights.iter().sum();
    if norm == 0.0 {
        return Err(IndicatorError::InvalidParameter(
            "offset cancels every weight".to_string(),
        ));
    }

    let mut result = vec![f64::NAN; src.len()];
    for i in (period + offset)..src.len() {
        let weighted: f64 = weights
            .iter()
            .enumerate()
            .map(|(k, w)| src[i - k] * w)
            .sum();
        result[i] = weighted / norm;
    }
    Ok(sequential_or_last(result, sequential))
}
