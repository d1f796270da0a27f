use crate::{
    CandleRow,
    error::{IndicatorError, check_len, check_period},
    helpers,
    slice::{sequential_or_last, slice_candles},
    source::{CandleSource, candle_source},
};

/// John Ehlers' Correlation Cycle components.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationCycleResult {
    /// Correlation against a cosine wave.
    pub real: Vec<f64>,
    /// Correlation against a negative sine wave.
    pub imag: Vec<f64>,
    /// Phase angle in degrees.
    pub angle: Vec<f64>,
    /// Market state: +1 trending up, -1 trending down, 0 transitioning.
    pub state: Vec<i32>,
}

/// Rolling beta of the market's returns against a benchmark's returns.
pub fn beta(
    candles: &[CandleRow],
    benchmark_candles: &[CandleRow],
    period: usize,
    sequential: bool,
) -> Result<Vec<f64>, IndicatorError> {
    check_period(period)?;
    if candles.len() != benchmark_candles.len() {
        return Err(IndicatorError::InvalidParameter(format!(
            "candles ({}) and benchmark ({}) must be the same length",
            candles.len(),
            benchmark_candles.len()
        )));
    }
    let candles_sliced = slice_candles(candles, sequential);
    let bench_sliced = slice_candles(benchmark_candles, sequential);
    check_len(candles_sliced.len(), period + 1)?;

    let close = candle_source(candles_sliced, CandleSource::Close);
    let bench = candle_source(bench_sliced, CandleSource::Close);

    let returns = pct_change(&close);
    let bench_returns = pct_change(&bench);

    let mut result = vec![f64::NAN; close.len()];
    for i in period..close.len() {
        let window = &returns[i + 1 - period..=i];
        let bench_window = &bench_returns[i + 1 - period..=i];

        let mean_b: f64 = bench_window.iter().sum::<f64>() / period as f64;
        let mean_r: f64 = window.iter().sum::<f64>() / period as f64;
        let mut cov = 0.0;
        let mut var = 0.0;
        for (r, b) in window.iter().zip(bench_window) {
            cov += (r - mean_r) * (b - mean_b);
            var += (b - mean_b) * (b - mean_b);
        }
        if var > f64::EPSILON {
            result[i] = cov / var;
        }
    }
    Ok(sequential_or_last(result, sequential))
}

fn pct_change(arr: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; arr.len()];
    for i in 1..arr.len() {
        if arr[i - 1] != 0.0 {
            out[i] = arr[i] / arr[i - 1] - 1.0;
        }
    }
    out
}

/// Rolling Pearson correlation between the high and low series.
pub fn correl(
    candles: &[CandleRow],
    period: usize,
    sequential: bool,
) -> Result<Vec<f64>, IndicatorError> {
    check_period(period)?;
    let candles = slice_candles(candles, sequential);
    check_len(candles.len(), period)?;
    let high = candle_source(candles, CandleSource::High);
    let low = candle_source(candles, CandleSource::Low);

    let mut result = vec![f64::NAN; high.len()];
    for i in (period - 1)..high.len() {
        result[i] = helpers::pearson(
            &high[i + 1 - period..=i],
            &low[i + 1 - period..=i],
        );
    }
    Ok(sequential_or_last(result, sequential))
}

/// Ehlers Correlation Cycle: price correlated against one cycle of cosine
/// and negative sine, with a phase angle and a hold-forward state machine.
pub fn correlation_cycle(
    candles: &[CandleRow],
    period: usize,
    threshold: f64,
    source: CandleSource,
    sequential: bool,
) -> Result<CorrelationCycleResult, IndicatorError> {
    check_period(period)?;
    let candles = slice_candles(candles, sequential);
    check_len(candles.len(), period + 1)?;
    let src = candle_source(candles, source);
    let size = src.len();

    let two_pi = 2.0 * std::f64::consts::PI;
    let cosine: Vec<f64> = (0..period)
        .map(|j| (two_pi * j as f64 / period as f64).cos())
        .collect();
    let neg_sine: Vec<f64> = (0..period)
        .map(|j| -(two_pi * j as f64 / period as f64).sin())
        .collect();

    let mut real = vec![f64::NAN; size];
    let mut imag = vec![f64::NAN; size];
    for i in (period - 1)..size {
        let window = &src[i + 1 - period..=i];
        real[i] = helpers::pearson(window, &cosine);
        imag[i] = helpers::pearson(window, &neg_sine);
    }

    // Phase angle with quadrant correction.
    let mut angle = vec![f64::NAN; size];
    for i in 0..size {
        if real[i].is_nan() || imag[i].is_nan() {
            continue;
        }
        let mut a = if imag[i] != 0.0 {
            90.0 + (real[i] / imag[i]).atan().to_degrees()
        } else {
            90.0
        };
        if imag[i] > 0.0 {
            a -= 180.0;
        }
        angle[i] = a;
    }

    // The angle may never roll backwards within a half-turn.
    for i in 1..size {
        if angle[i].is_nan() || angle[i - 1].is_nan() {
            continue;
        }
        if angle[i - 1] > angle[i] && angle[i - 1] - angle[i] < 270.0 {
            angle[i] = angle[i - 1];
        }
    }

    // State: trending while the angle holds still, signed by hemisphere.
    let mut state = vec![0i32; size];
    for i in 1..size {
        if angle[i].is_nan() || angle[i - 1].is_nan() {
            continue;
        }
        if (angle[i] - angle[i - 1]).abs() < threshold {
            state[i] = if angle[i] < 0.0 { -1 } else { 1 };
        }
    }

    if sequential {
        return Ok(CorrelationCycleResult {
            real,
            imag,
            angle,
            state,
        });
    }
    Ok(CorrelationCycleResult {
        real: vec![real[size - 1]],
        imag: vec![imag[size - 1]],
        angle: vec![angle[size - 1]],
        state: vec![state[size - 1]],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candles_from_closes(closes: &[f64]) -> Vec<CandleRow> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| [(i as f64) * 60_000.0, c, c, c + 1.0, c - 1.0, 10.0])
            .collect()
    }

    #[test]
    fn beta_of_identical_series_is_one() {
        let market = candles_from_closes(&[100.0, 101.0, 99.5, 102.0, 103.0, 101.5, 104.0]);
        let result = beta(&market, &market, 5, false).unwrap();
        assert!((result[0] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn beta_scales_with_amplified_moves() {
        let bench: Vec<f64> = vec![100.0, 101.0, 99.5, 102.0, 103.0, 101.5, 104.0];
        // Market moves twice the benchmark's return each bar.
        let mut market = vec![100.0];
        for i in 1..bench.len() {
            let r = bench[i] / bench[i - 1] - 1.0;
            let prev = *market.last().unwrap();
            market.push(prev * (1.0 + 2.0 * r));
        }
        let result = beta(
            &candles_from_closes(&market),
            &candles_from_closes(&bench),
            5,
            false,
        )
        .unwrap();
        assert!((result[0] - 2.0).abs() < 1e-9);
    }

    #[test]
    fn beta_requires_matching_lengths() {
        let a = candles_from_closes(&[1.0, 2.0, 3.0]);
        let b = candles_from_closes(&[1.0, 2.0]);
        assert!(beta(&a, &b, 2, true).is_err());
    }

    #[test]
    fn correl_high_for_parallel_bands() {
        // High and low move in lockstep: correlation 1.
        let data = candles_from_closes(&[100.0, 102.0, 101.0, 104.0, 103.0, 106.0]);
        let result = correl(&data, 5, false).unwrap();
        assert!((result[0] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn correlation_cycle_locks_onto_its_own_wave() {
        let period = 20;
        let closes: Vec<f64> = (0..80)
            .map(|i| {
                100.0 + 10.0 * (2.0 * std::f64::consts::PI * i as f64 / period as f64).cos()
            })
            .collect();
        let result =
            correlation_cycle(&candles_from_closes(&closes), period, 9.0, CandleSource::Close, true)
                .unwrap();
        assert_eq!(result.real.len(), 80);
        assert!(result.real[period - 2].is_nan());
        // A cosine input correlates strongly with the cosine reference.
        assert!(result.real[79].abs() > 0.9);
        assert!(!result.angle[79].is_nan());
        assert_eq!(result.state.len(), 80);
    }
}
