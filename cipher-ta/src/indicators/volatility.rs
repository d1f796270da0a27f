use crate::{
    CandleRow,
    error::{IndicatorError, check_len, check_period},
    helpers,
    slice::{sequential_or_last, slice_candles},
    source::{CandleSource, candle_source},
};

/// Damiani Volatmeter components.
#[derive(Debug, Clone, PartialEq)]
pub struct DamianiVolatmeterResult {
    /// Volatility ratio with lag compensation.
    pub vol: Vec<f64>,
    /// Threshold minus the standard-deviation ratio.
    pub anti: Vec<f64>,
}

/// Average True Range (Wilder smoothing).
pub fn atr(
    candles: &[CandleRow],
    period: usize,
    sequential: bool,
) -> Result<Vec<f64>, IndicatorError> {
    check_period(period)?;
    let candles = slice_candles(candles, sequential);
    check_len(candles.len(), period)?;
    let high = candle_source(candles, CandleSource::High);
    let low = candle_source(candles, CandleSource::Low);
    let close = candle_source(candles, CandleSource::Close);

    Ok(sequential_or_last(
        helpers::atr_series(&high, &low, &close, period),
        sequential,
    ))
}

/// Bollinger Bands Width: band spread relative to the middle band.
pub fn bbw(
    candles: &[CandleRow],
    period: usize,
    mult: f64,
    source: CandleSource,
    sequential: bool,
) -> Result<Vec<f64>, IndicatorError> {
    check_period(period)?;
    let candles = slice_candles(candles, sequential);
    check_len(candles.len(), period)?;
    let src = candle_source(candles, source);

    let middle = helpers::sma(&src, period);
    let std = helpers::rolling_std(&src, period);
    let result = middle
        .iter()
        .zip(&std)
        .map(|(mid, sd)| {
            if *mid != 0.0 {
                2.0 * mult * sd / mid
            } else {
                f64::NAN
            }
        })
        .collect();
    Ok(sequential_or_last(result, sequential))
}

/// Choppiness Index: 0..100, higher when the market trades sideways.
pub fn chop(
    candles: &[CandleRow],
    period: usize,
    scalar: f64,
    drift: usize,
    sequential: bool,
) -> Result<Vec<f64>, IndicatorError> {
    check_period(period)?;
    check_period(drift)?;
    let candles = slice_candles(candles, sequential);
    check_len(candles.len(), period + 1)?;
    let high = candle_source(candles, CandleSource::High);
    let low = candle_source(candles, CandleSource::Low);
    let close = candle_source(candles, CandleSource::Close);

    let atr_drift = helpers::atr_series(&high, &low, &close, drift);
    let atr_sum = helpers::rolling_sum(&atr_drift[drift - 1..], period);
    let high_max = helpers::rolling_max(&high, period);
    let low_min = helpers::rolling_min(&low, period);

    let mut result = vec![f64::NAN; high.len()];
    let log_period = (period as f64).log10();
    for i in (period + drift - 2)..high.len() {
        let range = high_max[i] - low_min[i];
        let summed = atr_sum[i - (drift - 1)];
        if range > f64::EPSILON && summed > 0.0 {
            result[i] = scalar * (summed / range).log10() / log_period;
        }
    }
    Ok(sequential_or_last(result, sequential))
}

/// Damiani Volatmeter: ATR ratio with lag suppression plus an
/// anti-trend-threshold line.
pub fn damiani_volatmeter(
    candles: &[CandleRow],
    vis_atr: usize,
    vis_std: usize,
    sed_atr: usize,
    sed_std: usize,
    threshold: f64,
    source: CandleSource,
    sequential: bool,
) -> Result<DamianiVolatmeterResult, IndicatorError> {
    for period in [vis_atr, vis_std, sed_atr, sed_std] {
        check_period(period)?;
    }
    let candles = slice_candles(candles, sequential);
    check_len(candles.len(), sed_std.max(sed_atr))?;
    let high = candle_source(candles, CandleSource::High);
    let low = candle_source(candles, CandleSource::Low);
    let close = candle_source(candles, CandleSource::Close);
    let src = candle_source(candles, source);
    let size = src.len();

    let atr_vis = helpers::atr_series(&high, &low, &close, vis_atr);
    let atr_sed = helpers::atr_series(&high, &low, &close, sed_atr);
    let std_vis = helpers::rolling_std(&src, vis_std);
    let std_sed = helpers::rolling_std(&src, sed_std);

    const LAG_SUPPRESSOR: f64 = 0.5;

    let mut vol = vec![0.0; size];
    for i in 3..size {
        let ratio = if atr_sed[i].is_nan() || atr_sed[i] == 0.0 || atr_vis[i].is_nan() {
            0.0
        } else {
            atr_vis[i] / atr_sed[i]
        };
        vol[i] = ratio + LAG_SUPPRESSOR * (vol[i - 1] - vol[i - 3]);
    }

    let mut anti = vec![f64::NAN; size];
    for i in 0..size {
        if !std_vis[i].is_nan() && !std_sed[i].is_nan() && std_sed[i] != 0.0 {
            anti[i] = threshold - std_vis[i] / std_sed[i];
        }
    }

    Ok(DamianiVolatmeterResult {
        vol: sequential_or_last(vol, sequential),
        anti: sequential_or_last(anti, sequential),
    })
}
