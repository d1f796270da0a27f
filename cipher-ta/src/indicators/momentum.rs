use crate::{
    CandleRow,
    error::{IndicatorError, check_len, check_period},
    helpers,
    slice::{sequential_or_last, slice_candles},
    source::{CandleSource, candle_source},
};

/// Accelerator Oscillator: the oscillator itself plus its one-bar momentum.
#[derive(Debug, Clone, PartialEq)]
pub struct AcResult {
    pub osc: Vec<f64>,
    pub change: Vec<f64>,
}

/// Awesome Oscillator plus its one-bar momentum.
#[derive(Debug, Clone, PartialEq)]
pub struct AoResult {
    pub osc: Vec<f64>,
    pub change: Vec<f64>,
}

/// Aroon Up and Down lines.
#[derive(Debug, Clone, PartialEq)]
pub struct AroonResult {
    pub down: Vec<f64>,
    pub up: Vec<f64>,
}

/// Accelerator Oscillator: `AO - SMA(AO, 5)` over the median price.
pub fn acosc(candles: &[CandleRow], sequential: bool) -> Result<AcResult, IndicatorError> {
    let candles = slice_candles(candles, sequential);
    check_len(candles.len(), 34)?;
    let median = candle_source(candles, CandleSource::Hl2);

    let ao: Vec<f64> = helpers::sma(&median, 5)
        .iter()
        .zip(&helpers::sma(&median, 34))
        .map(|(fast, slow)| fast - slow)
        .collect();
    let ac: Vec<f64> = ao
        .iter()
        .zip(&helpers::sma(&ao, 5))
        .map(|(a, s)| a - s)
        .collect();
    let change = helpers::momentum(&ac, 1);

    Ok(AcResult {
        osc: sequential_or_last(ac, sequential),
        change: sequential_or_last(change, sequential),
    })
}

/// Awesome Oscillator: `SMA(hl2, 5) - SMA(hl2, 34)`.
pub fn ao(candles: &[CandleRow], sequential: bool) -> Result<AoResult, IndicatorError> {
    let candles = slice_candles(candles, sequential);
    check_len(candles.len(), 34)?;
    let median = candle_source(candles, CandleSource::Hl2);

    let osc: Vec<f64> = helpers::sma(&median, 5)
        .iter()
        .zip(&helpers::sma(&median, 34))
        .map(|(fast, slow)| fast - slow)
        .collect();
    let change = helpers::momentum(&osc, 1);

    Ok(AoResult {
        osc: sequential_or_last(osc, sequential),
        change: sequential_or_last(change, sequential),
    })
}

/// Aroon: bars since the window extreme, scaled to 0..100.
pub fn aroon(
    candles: &[CandleRow],
    period: usize,
    sequential: bool,
) -> Result<AroonResult, IndicatorError> {
    check_period(period)?;
    let candles = slice_candles(candles, sequential);
    check_len(candles.len(), period + 1)?;
    let high = candle_source(candles, CandleSource::High);
    let low = candle_source(candles, CandleSource::Low);

    let mut up = vec![f64::NAN; high.len()];
    let mut down = vec![f64::NAN; high.len()];
    for i in period..high.len() {
        let window_start = i - period;
        let (mut max_idx, mut min_idx) = (window_start, window_start);
        for j in window_start..=i {
            if high[j] >= high[max_idx] {
                max_idx = j;
            }
            if low[j] <= low[min_idx] {
                min_idx = j;
            }
        }
        up[i] = 100.0 * (period - (i - max_idx)) as f64 / period as f64;
        down[i] = 100.0 * (period - (i - min_idx)) as f64 / period as f64;
    }

    Ok(AroonResult {
        down: sequential_or_last(down, sequential),
        up: sequential_or_last(up, sequential),
    })
}

/// Aroon Oscillator: Aroon Up minus Aroon Down.
pub fn aroonosc(
    candles: &[CandleRow],
    period: usize,
    sequential: bool,
) -> Result<Vec<f64>, IndicatorError> {
    let result = aroon(candles, period, true)?;
    let osc: Vec<f64> = result
        .up
        .iter()
        .zip(&result.down)
        .map(|(u, d)| u - d)
        .collect();
    // `aroon` saw unsliced input; trim to the same view a direct
    // non-sequential call would use.
    let sliced_len = slice_candles(candles, sequential).len();
    let osc = osc[osc.len() - sliced_len..].to_vec();
    Ok(sequential_or_last(osc, sequential))
}

/// Balance of Power: `(close - open) / (high - low)` per bar.
pub fn bop(candles: &[CandleRow], sequential: bool) -> Result<Vec<f64>, IndicatorError> {
    let candles = slice_candles(candles, sequential);
    check_len(candles.len(), 1)?;

    let result = candles
        .iter()
        .map(|row| {
            let range = row[3] - row[4];
            if range.abs() > f64::EPSILON {
                (row[2] - row[1]) / range
            } else {
                0.0
            }
        })
        .collect();
    Ok(sequential_or_last(result, sequential))
}

/// Commodity Channel Index over the typical price (hlc3).
pub fn cci(
    candles: &[CandleRow],
    period: usize,
    sequential: bool,
) -> Result<Vec<f64>, IndicatorError> {
    check_period(period)?;
    let candles = slice_candles(candles, sequential);
    check_len(candles.len(), period)?;
    let tp = candle_source(candles, CandleSource::Hlc3);
    let tp_sma = helpers::sma(&tp, period);

    let mut result = vec![f64::NAN; tp.len()];
    for (i, window) in tp.windows(period).enumerate() {
        let idx = i + period - 1;
        let mean = tp_sma[idx];
        let mean_dev =
            window.iter().map(|v| (v - mean).abs()).sum::<f64>() / period as f64;
        if mean_dev > f64::EPSILON {
            result[idx] = (tp[idx] - mean) / (0.015 * mean_dev);
        } else {
            result[idx] = 0.0;
        }
    }
    Ok(sequential_or_last(result, sequential))
}

/// Chande Forecast Oscillator: percentage gap between price and its linear
/// regression forecast.
pub fn cfo(
    candles: &[CandleRow],
    period: usize,
    scalar: f64,
    source: CandleSource,
    sequential: bool,
) -> Result<Vec<f64>, IndicatorError> {
    check_period(period)?;
    let candles = slice_candles(candles, sequential);
    check_len(candles.len(), period)?;
    let src = candle_source(candles, source);
    let forecast = helpers::linreg_endpoint(&src, period);

    let result = src
        .iter()
        .zip(&forecast)
        .map(|(price, fit)| {
            if *price != 0.0 {
                scalar * (price - fit) / price
            } else {
                f64::NAN
            }
        })
        .collect();
    Ok(sequential_or_last(result, sequential))
}

/// Ehlers Center of Gravity oscillator.
pub fn cg(
    candles: &[CandleRow],
    period: usize,
    source: CandleSource,
    sequential: bool,
) -> Result<Vec<f64>, IndicatorError> {
    check_period(period)?;
    let candles = slice_candles(candles, sequential);
    check_len(candles.len(), period)?;
    let src = candle_source(candles, source);

    let mut result = vec![f64::NAN; src.len()];
    for i in (period - 1)..src.len() {
        let mut num = 0.0;
        let mut den = 0.0;
        for k in 0..period {
            num += (k as f64 + 1.0) * src[i - k];
            den += src[i - k];
        }
        if den != 0.0 {
            result[i] = -num / den + (period as f64 + 1.0) / 2.0;
        }
    }
    Ok(sequential_or_last(result, sequential))
}

/// Chande Momentum Oscillator: gain/loss balance scaled to -100..100.
pub fn cmo(
    candles: &[CandleRow],
    period: usize,
    source: CandleSource,
    sequential: bool,
) -> Result<Vec<f64>, IndicatorError> {
    check_period(period)?;
    let candles = slice_candles(candles, sequential);
    check_len(candles.len(), period + 1)?;
    let src = candle_source(candles, source);

    let diff = helpers::momentum(&src, 1);
    let gains: Vec<f64> = diff.iter().map(|d| if *d > 0.0 { *d } else { 0.0 }).collect();
    let losses: Vec<f64> = diff.iter().map(|d| if *d < 0.0 { -*d } else { 0.0 }).collect();

    let mut result = vec![f64::NAN; src.len()];
    for i in period..src.len() {
        let up: f64 = gains[i + 1 - period..=i].iter().sum();
        let down: f64 = losses[i + 1 - period..=i].iter().sum();
        let total = up + down;
        if total > f64::EPSILON {
            result[i] = 100.0 * (up - down) / total;
        } else {
            result[i] = 0.0;
        }
    }
    Ok(sequential_or_last(result, sequential))
}

/// William Blau's Dynamic Trend Index: triple-smoothed directional pressure.
pub fn dti(
    candles: &[CandleRow],
    r: usize,
    s: usize,
    u: usize,
    sequential: bool,
) -> Result<Vec<f64>, IndicatorError> {
    check_period(r)?;
    check_period(s)?;
    check_period(u)?;
    let candles = slice_candles(candles, sequential);
    check_len(candles.len(), 2)?;
    let high = candle_source(candles, CandleSource::High);
    let low = candle_source(candles, CandleSource::Low);

    let size = high.len();
    let mut pressure = vec![0.0; size];
    let mut pressure_abs = vec![0.0; size];
    for i in 1..size {
        let up = (high[i] - high[i - 1]).max(0.0);
        let down = (-(low[i] - low[i - 1])).max(0.0);
        pressure[i] = up - down;
        pressure_abs[i] = pressure[i].abs();
    }

    let smooth = helpers::ema(&helpers::ema(&helpers::ema(&pressure, r), s), u);
    let smooth_abs = helpers::ema(&helpers::ema(&helpers::ema(&pressure_abs, r), s), u);

    let result = smooth
        .iter()
        .zip(&smooth_abs)
        .map(|(num, den)| {
            if den.abs() > f64::EPSILON {
                100.0 * num / den
            } else {
                0.0
            }
        })
        .collect();
    Ok(sequential_or_last(result, sequential))
}

/// Elder's Force Index: EMA of one-bar price change times volume.
pub fn efi(
    candles: &[CandleRow],
    period: usize,
    source: CandleSource,
    sequential: bool,
) -> Result<Vec<f64>, IndicatorError> {
    check_period(period)?;
    let candles = slice_candles(candles, sequential);
    check_len(candles.len(), 2)?;
    let src = candle_source(candles, source);
    let volume = candle_source(candles, CandleSource::Volume);

    let mut force = vec![0.0; src.len()];
    for i in 1..src.len() {
        force[i] = (src[i] - src[i - 1]) * volume[i];
    }
    Ok(sequential_or_last(helpers::ema(&force, period), sequential))
}
