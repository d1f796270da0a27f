use crate::error::InstrumentError;
use serde::{Deserialize, Serialize};

/// Duration bucket for candle aggregation.
///
/// The set is closed. Variants are declared shortest-first so the derived
/// `Ord` orders by duration.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize,
)]
pub enum Timeframe {
    #[serde(rename = "1m")]
    Minute1,
    #[serde(rename = "3m")]
    Minute3,
    #[serde(rename = "5m")]
    Minute5,
    #[serde(rename = "15m")]
    Minute15,
    #[serde(rename = "30m")]
    Minute30,
    #[serde(rename = "45m")]
    Minute45,
    #[serde(rename = "1h")]
    Hour1,
    #[serde(rename = "2h")]
    Hour2,
    #[serde(rename = "3h")]
    Hour3,
    #[serde(rename = "4h")]
    Hour4,
    #[serde(rename = "6h")]
    Hour6,
    #[serde(rename = "8h")]
    Hour8,
    #[serde(rename = "12h")]
    Hour12,
    #[serde(rename = "1D")]
    Day1,
    #[serde(rename = "3D")]
    Day3,
    #[serde(rename = "1W")]
    Week1,
    #[serde(rename = "1M")]
    Month1,
}

impl Timeframe {
    /// Return the &str representation of this [`Timeframe`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::Minute1 => "1m",
            Timeframe::Minute3 => "3m",
            Timeframe::Minute5 => "5m",
            Timeframe::Minute15 => "15m",
            Timeframe::Minute30 => "30m",
            Timeframe::Minute45 => "45m",
            Timeframe::Hour1 => "1h",
            Timeframe::Hour2 => "2h",
            Timeframe::Hour3 => "3h",
            Timeframe::Hour4 => "4h",
            Timeframe::Hour6 => "6h",
            Timeframe::Hour8 => "8h",
            Timeframe::Hour12 => "12h",
            Timeframe::Day1 => "1D",
            Timeframe::Day3 => "3D",
            Timeframe::Week1 => "1W",
            Timeframe::Month1 => "1M",
        }
    }

    /// Number of one-minute candles this timeframe spans.
    pub fn minutes(&self) -> i64 {
        match self {
            Timeframe::Minute1 => 1,
            Timeframe::Minute3 => 3,
            Timeframe::Minute5 => 5,
            Timeframe::Minute15 => 15,
            Timeframe::Minute30 => 30,
            Timeframe::Minute45 => 45,
            Timeframe::Hour1 => 60,
            Timeframe::Hour2 => 60 * 2,
            Timeframe::Hour3 => 60 * 3,
            Timeframe::Hour4 => 60 * 4,
            Timeframe::Hour6 => 60 * 6,
            Timeframe::Hour8 => 60 * 8,
            Timeframe::Hour12 => 60 * 12,
            Timeframe::Day1 => 60 * 24,
            Timeframe::Day3 => 60 * 24 * 3,
            Timeframe::Week1 => 60 * 24 * 7,
            Timeframe::Month1 => 60 * 24 * 30,
        }
    }

    /// Duration in epoch milliseconds.
    pub fn millis(&self) -> i64 {
        self.minutes() * 60_000
    }

    /// Every variant, shortest first.
    pub fn all() -> &'static [Timeframe] {
        use Timeframe::*;
        &[
            Minute1, Minute3, Minute5, Minute15, Minute30, Minute45, Hour1, Hour2, Hour3, Hour4,
            Hour6, Hour8, Hour12, Day1, Day3, Week1, Month1,
        ]
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Timeframe {
    type Err = InstrumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Timeframe::all()
            .iter()
            .find(|tf| tf.as_str() == s)
            .copied()
            .ok_or_else(|| InstrumentError::InvalidTimeframe(s.to_string()))
    }
}

/// The element of `timeframes` with the highest minute count.
///
/// Returns `None` for an empty input.
pub fn max_timeframe(timeframes: &[Timeframe]) -> Option<Timeframe> {
    timeframes.iter().max_by_key(|tf| tf.minutes()).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn string_forms_round_trip() {
        for tf in Timeframe::all() {
            assert_eq!(Timeframe::from_str(tf.as_str()).unwrap(), *tf);
        }
    }

    #[test]
    fn unknown_timeframe_fails() {
        assert!(matches!(
            Timeframe::from_str("7m"),
            Err(InstrumentError::InvalidTimeframe(_))
        ));
        // Case matters: daily and monthly forms are upper-case.
        assert!(Timeframe::from_str("1d").is_err());
    }

    #[test]
    fn ordering_follows_minutes() {
        assert!(Timeframe::Minute45 < Timeframe::Hour1);
        assert!(Timeframe::Day3 < Timeframe::Week1);
        assert_eq!(Timeframe::Hour4.minutes(), 240);
        assert_eq!(Timeframe::Hour1.millis(), 3_600_000);
    }

    #[test]
    fn max_of_list() {
        let tfs = [Timeframe::Hour4, Timeframe::Minute15, Timeframe::Day1];
        assert_eq!(max_timeframe(&tfs), Some(Timeframe::Day1));
        assert_eq!(max_timeframe(&[]), None);
    }
}
