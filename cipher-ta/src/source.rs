use crate::CandleRow;
use serde::{Deserialize, Serialize};

/// Which price series an indicator reads from a candle matrix.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum CandleSource {
    #[default]
    Close,
    High,
    Low,
    Open,
    Volume,
    /// `(high + low) / 2`
    Hl2,
    /// `(high + low + close) / 3`
    Hlc3,
    /// `(open + high + low + close) / 4`
    Ohlc4,
}

/// Extract the selected series from candle rows.
pub fn candle_source(candles: &[CandleRow], source: CandleSource) -> Vec<f64> {
    candles
        .iter()
        .map(|row| match source {
            CandleSource::Close => row[2],
            CandleSource::High => row[3],
            CandleSource::Low => row[4],
            CandleSource::Open => row[1],
            CandleSource::Volume => row[5],
            CandleSource::Hl2 => (row[3] + row[4]) / 2.0,
            CandleSource::Hlc3 => (row[3] + row[4] + row[2]) / 3.0,
            CandleSource::Ohlc4 => (row[1] + row[3] + row[4] + row[2]) / 4.0,
        })
        .collect()
}
