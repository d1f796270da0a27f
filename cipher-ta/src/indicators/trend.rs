use crate::{
    CandleRow,
    error::{IndicatorError, check_len, check_period},
    helpers,
    slice::{sequential_or_last, slice_candles},
    source::{CandleSource, candle_source},
};

/// Directional Indicator lines.
#[derive(Debug, Clone, PartialEq)]
pub struct DiResult {
    pub plus: Vec<f64>,
    pub minus: Vec<f64>,
}

/// Smoothed Directional Movement lines.
#[derive(Debug, Clone, PartialEq)]
pub struct DmResult {
    pub plus: Vec<f64>,
    pub minus: Vec<f64>,
}

/// Donchian Channel bands.
#[derive(Debug, Clone, PartialEq)]
pub struct DonchianResult {
    pub upperband: Vec<f64>,
    pub middleband: Vec<f64>,
    pub lowerband: Vec<f64>,
}

/// Chande Kroll stop lines.
#[derive(Debug, Clone, PartialEq)]
pub struct CkspResult {
    pub long_stop: Vec<f64>,
    pub short_stop: Vec<f64>,
}

/// True range / directional movement triple used by the ADX family.
fn directional_inputs(candles: &[CandleRow]) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let high = candle_source(candles, CandleSource::High);
    let low = candle_source(candles, CandleSource::Low);
    let close = candle_source(candles, CandleSource::Close);
    let size = high.len();

    let mut tr = vec![0.0; size];
    let mut plus_dm = vec![0.0; size];
    let mut minus_dm = vec![0.0; size];
    for i in 1..size {
        let hl = high[i] - low[i];
        let hc = (high[i] - close[i - 1]).abs();
        let lc = (low[i] - close[i - 1]).abs();
        tr[i] = hl.max(hc).max(lc);

        let h_diff = high[i] - high[i - 1];
        let l_diff = low[i - 1] - low[i];
        if h_diff > l_diff && h_diff > 0.0 {
            plus_dm[i] = h_diff;
        }
        if l_diff > h_diff && l_diff > 0.0 {
            minus_dm[i] = l_diff;
        }
    }
    (tr, plus_dm, minus_dm)
}

/// DI+/DI- and DX series shared by [`adx`] and [`di`].
fn directional_index(candles: &[CandleRow], period: usize) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let (tr, plus_dm, minus_dm) = directional_inputs(candles);
    let size = tr.len();

    let tr_smooth = helpers::wilder_smooth(&tr, period);
    let plus_smooth = helpers::wilder_smooth(&plus_dm, period);
    let minus_smooth = helpers::wilder_smooth(&minus_dm, period);

    let mut di_plus = vec![0.0; size];
    let mut di_minus = vec![0.0; size];
    let mut dx = vec![0.0; size];
    for i in period..size {
        if tr_smooth[i] > f64::EPSILON {
            di_plus[i] = 100.0 * plus_smooth[i] / tr_smooth[i];
            di_minus[i] = 100.0 * minus_smooth[i] / tr_smooth[i];
            let di_sum = di_plus[i] + di_minus[i];
            if di_sum > f64::EPSILON {
                dx[i] = 100.0 * (di_plus[i] - di_minus[i]).abs() / di_sum;
            }
        }
    }
    (di_plus, di_minus, dx)
}

/// Average Directional Index: Wilder-smoothed trend strength.
pub fn adx(
    candles: &[CandleRow],
    period: usize,
    sequential: bool,
) -> Result<Vec<f64>, IndicatorError> {
    check_period(period)?;
    let candles = slice_candles(candles, sequential);
    check_len(candles.len(), 2 * period + 1)?;
    let (_, _, dx) = directional_index(candles, period);

    let size = dx.len();
    let start = 2 * period;
    let mut result = vec![f64::NAN; size];
    let seed: f64 = dx[period..start].iter().sum::<f64>() / period as f64;
    result[start] = seed;
    for i in start + 1..size {
        result[i] = (result[i - 1] * (period as f64 - 1.0) + dx[i]) / period as f64;
    }
    Ok(sequential_or_last(result, sequential))
}

/// ADX Rating: average of the current ADX and the ADX `period` bars ago.
///
/// Uses a running Wilder smoothing seeded from the first bar, so it warms up
/// faster than [`adx`] at the cost of early-sample bias.
pub fn adxr(
    candles: &[CandleRow],
    period: usize,
    sequential: bool,
) -> Result<Vec<f64>, IndicatorError> {
    check_period(period)?;
    let candles = slice_candles(candles, sequential);
    check_len(candles.len(), 2 * period + 1)?;
    let (tr, plus_dm, minus_dm) = directional_inputs(candles);
    let size = tr.len();

    // Running smoothing from the very first bar.
    let mut str_s = vec![0.0; size];
    let mut plus_s = vec![0.0; size];
    let mut minus_s = vec![0.0; size];
    str_s[0] = tr[0];
    plus_s[0] = plus_dm[0];
    minus_s[0] = minus_dm[0];
    for i in 1..size {
        str_s[i] = str_s[i - 1] - str_s[i - 1] / period as f64 + tr[i];
        plus_s[i] = plus_s[i - 1] - plus_s[i - 1] / period as f64 + plus_dm[i];
        minus_s[i] = minus_s[i - 1] - minus_s[i - 1] / period as f64 + minus_dm[i];
    }

    let mut dx = vec![0.0; size];
    for i in 0..size {
        if str_s[i] > f64::EPSILON {
            let di_plus = 100.0 * plus_s[i] / str_s[i];
            let di_minus = 100.0 * minus_s[i] / str_s[i];
            let di_sum = di_plus + di_minus;
            if di_sum > f64::EPSILON {
                dx[i] = 100.0 * (di_plus - di_minus).abs() / di_sum;
            }
        }
    }

    let adx_line = helpers::sma(&dx, period);
    let mut result = vec![f64::NAN; size];
    for i in period..size {
        result[i] = (adx_line[i] + adx_line[i - period]) / 2.0;
    }
    Ok(sequential_or_last(result, sequential))
}

/// Directional Indicator: the DI+ and DI- lines.
pub fn di(
    candles: &[CandleRow],
    period: usize,
    sequential: bool,
) -> Result<DiResult, IndicatorError> {
    check_period(period)?;
    let candles = slice_candles(candles, sequential);
    check_len(candles.len(), period + 1)?;
    let (di_plus, di_minus, _) = directional_index(candles, period);

    let nan_warmup = |mut series: Vec<f64>| {
        for value in series.iter_mut().take(period) {
            *value = f64::NAN;
        }
        series
    };

    Ok(DiResult {
        plus: sequential_or_last(nan_warmup(di_plus), sequential),
        minus: sequential_or_last(nan_warmup(di_minus), sequential),
    })
}

/// Directional Movement: Wilder-smoothed +DM and -DM.
pub fn dm(
    candles: &[CandleRow],
    period: usize,
    sequential: bool,
) -> Result<DmResult, IndicatorError> {
    check_period(period)?;
    let candles = slice_candles(candles, sequential);
    check_len(candles.len(), period + 1)?;
    let (_, plus_dm, minus_dm) = directional_inputs(candles);

    let smooth_with_warmup = |series: &[f64]| {
        let mut smoothed = helpers::wilder_smooth(series, period);
        for value in smoothed.iter_mut().take(period) {
            *value = f64::NAN;
        }
        smoothed
    };

    Ok(DmResult {
        plus: sequential_or_last(smooth_with_warmup(&plus_dm), sequential),
        minus: sequential_or_last(smooth_with_warmup(&minus_dm), sequential),
    })
}

/// Donchian Channels over the window extremes.
pub fn donchian(
    candles: &[CandleRow],
    period: usize,
    sequential: bool,
) -> Result<DonchianResult, IndicatorError> {
    check_period(period)?;
    let candles = slice_candles(candles, sequential);
    check_len(candles.len(), period)?;
    let high = candle_source(candles, CandleSource::High);
    let low = candle_source(candles, CandleSource::Low);

    let upper = helpers::rolling_max(&high, period);
    let lower = helpers::rolling_min(&low, period);
    let middle = upper
        .iter()
        .zip(&lower)
        .map(|(u, l)| (u + l) / 2.0)
        .collect();

    Ok(DonchianResult {
        upperband: sequential_or_last(upper, sequential),
        middleband: sequential_or_last(middle, sequential),
        lowerband: sequential_or_last(lower, sequential),
    })
}

/// Chande Kroll Stop: ATR offsets from rolling extremes, re-smoothed by a
/// second rolling pass.
pub fn cksp(
    candles: &[CandleRow],
    p: usize,
    x: f64,
    q: usize,
    sequential: bool,
) -> Result<CkspResult, IndicatorError> {
    check_period(p)?;
    check_period(q)?;
    let candles = slice_candles(candles, sequential);
    check_len(candles.len(), p + q)?;
    let high = candle_source(candles, CandleSource::High);
    let low = candle_source(candles, CandleSource::Low);
    let close = candle_source(candles, CandleSource::Close);

    let atr = helpers::atr_series(&high, &low, &close, p);
    let high_max = helpers::rolling_max(&high, p);
    let low_min = helpers::rolling_min(&low, p);

    let long_first: Vec<f64> = high_max.iter().zip(&atr).map(|(h, a)| h - x * a).collect();
    let short_first: Vec<f64> = low_min.iter().zip(&atr).map(|(l, a)| l + x * a).collect();

    Ok(CkspResult {
        long_stop: sequential_or_last(helpers::rolling_max(&long_first, q), sequential),
        short_stop: sequential_or_last(helpers::rolling_min(&short_first, q), sequential),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trending(n: usize) -> Vec<CandleRow> {
        (0..n)
            .map(|i| {
                let c = 100.0 + i as f64;
                [(i as f64) * 60_000.0, c - 0.5, c, c + 1.0, c - 1.0, 10.0]
            })
            .collect()
    }

    fn choppy(n: usize) -> Vec<CandleRow> {
        (0..n)
            .map(|i| {
                let c = 100.0 + if i % 2 == 0 { 1.0 } else { -1.0 };
                [(i as f64) * 60_000.0, c, c, c + 2.0, c - 2.0, 10.0]
            })
            .collect()
    }

    #[test]
    fn adx_is_high_in_a_trend() {
        let seq = adx(&trending(80), 14, true).unwrap();
        assert!(seq[2 * 14 - 1].is_nan());
        assert!(!seq[2 * 14].is_nan());
        // Pure uptrend: DX is 100 everywhere it is defined.
        assert!(seq[79] > 90.0);
    }

    #[test]
    fn adx_needs_two_periods() {
        assert!(matches!(
            adx(&trending(28), 14, true),
            Err(IndicatorError::InsufficientData { .. })
        ));
    }

    #[test]
    fn adx_low_in_chop() {
        let value = adx(&choppy(120), 14, false).unwrap()[0];
        let trend = adx(&trending(120), 14, false).unwrap()[0];
        assert!(value < trend);
    }

    #[test]
    fn adxr_averages_current_and_lagged() {
        let seq = adxr(&trending(80), 14, true).unwrap();
        assert!(seq[13].is_nan());
        assert!(!seq[2 * 14].is_nan());
        assert!(seq[79] > 90.0);
    }

    #[test]
    fn di_separates_in_an_uptrend() {
        let result = di(&trending(60), 14, true).unwrap();
        assert!(result.plus[13].is_nan());
        // Only upward movement: DI+ settles near 100 * 1/2 (DM 1 vs TR 2)
        // and DI- stays at zero.
        assert!(result.plus[59] > 40.0);
        assert!(result.minus[59] < 1e-9);
    }

    #[test]
    fn dm_smooths_directional_movement() {
        let result = dm(&trending(60), 14, false).unwrap();
        assert!(result.plus[0] > 0.0);
        assert_eq!(result.minus[0], 0.0);
    }

    #[test]
    fn donchian_brackets_price() {
        let result = donchian(&trending(40), 20, false).unwrap();
        // Last 20 bars: highs up to 140, lows down to 119.
        assert_eq!(result.upperband[0], 140.0);
        assert_eq!(result.lowerband[0], 119.0);
        assert_eq!(result.middleband[0], (140.0 + 119.0) / 2.0);
    }

    #[test]
    fn cksp_stops_track_the_trend() {
        let result = cksp(&trending(60), 10, 1.0, 9, true).unwrap();
        assert_eq!(result.long_stop.len(), 60);
        let long = result.long_stop[59];
        let short = result.short_stop[59];
        // Long stop trails the recent highs; the short stop re-minimum lags
        // further behind on a rising series.
        assert!(long < 160.0 && long > 150.0);
        assert!(short > 140.0 && short < 150.0);
        assert!(short < long);
    }
}
