use crate::{error::InstrumentError, timeframe::Timeframe};
use chrono::{DateTime, NaiveDateTime, Utc};

/// Milliseconds in one minute; candle timestamps align to multiples of this.
pub const ONE_MINUTE_MS: i64 = 60_000;

/// Convert a millisecond epoch timestamp to a UTC datetime.
///
/// Timestamps outside chrono's representable range do not occur in market
/// data; they clamp to the epoch.
pub fn timestamp_to_datetime(timestamp: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(timestamp).unwrap_or_default()
}

/// Convert a UTC datetime to a millisecond epoch timestamp.
pub fn datetime_to_timestamp(datetime: DateTime<Utc>) -> i64 {
    datetime.timestamp_millis()
}

/// `"YYYY-MM-DD"` date form of a timestamp.
pub fn timestamp_to_date(timestamp: i64) -> String {
    timestamp_to_datetime(timestamp).format("%Y-%m-%d").to_string()
}

/// `"YYYY-MM-DD HH:MM:SS"` datetime form of a timestamp.
pub fn timestamp_to_time(timestamp: i64) -> String {
    timestamp_to_datetime(timestamp)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// ISO-8601 form with millisecond precision, eg/
/// `"2021-01-05T00:00:00.000Z"`.
pub fn timestamp_to_iso8601(timestamp: i64) -> String {
    timestamp_to_datetime(timestamp)
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
}

/// Parse an ISO-8601 string back to a millisecond timestamp.
///
/// The fractional part is optional but must be exactly three digits when
/// present, and the trailing `Z` is required.
pub fn iso8601_to_timestamp(iso8601: &str) -> Result<i64, InstrumentError> {
    for format in ["%Y-%m-%dT%H:%M:%S%.3fZ", "%Y-%m-%dT%H:%M:%SZ"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(iso8601, format) {
            return Ok(naive.and_utc().timestamp_millis());
        }
    }
    Err(InstrumentError::InvalidIso8601(iso8601.to_string()))
}

/// Timestamp of today's UTC midnight.
pub fn today_to_timestamp() -> i64 {
    let now = Utc::now().timestamp_millis();
    now - now.rem_euclid(86_400_000)
}

/// Absolute whole-day difference between two datetimes.
pub fn date_diff_in_days(date1: DateTime<Utc>, date2: DateTime<Utc>) -> i64 {
    (date2 - date1).num_days().abs()
}

/// Timestamp of the current (forming) one-minute candle.
pub fn current_1m_candle_timestamp() -> i64 {
    let now = Utc::now().timestamp_millis();
    now - now.rem_euclid(ONE_MINUTE_MS)
}

/// Open timestamp of the candle following one opened at `candle_timestamp`.
pub fn next_candle_timestamp(candle_timestamp: i64, timeframe: Timeframe) -> i64 {
    candle_timestamp + timeframe.millis()
}

/// Human-readable duration, eg/ `readable_duration(90, 2)` ->
/// `"1 minute, 30 seconds"`.
///
/// `granularity` limits how many units are reported, largest first.
pub fn readable_duration(seconds: i64, granularity: usize) -> String {
    const INTERVALS: &[(&str, i64)] = &[
        ("weeks", 604_800),
        ("days", 86_400),
        ("hours", 3_600),
        ("minutes", 60),
        ("seconds", 1),
    ];

    let mut remaining = seconds;
    let mut parts = Vec::new();
    for &(name, count) in INTERVALS {
        let value = remaining / count;
        if value > 0 {
            remaining -= value * count;
            let unit = if value == 1 {
                &name[..name.len() - 1]
            } else {
                name
            };
            parts.push(format!("{value} {unit}"));
        }
    }

    parts.truncate(granularity.min(parts.len()));
    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iso8601_round_trip() {
        for ts in [0, 1_609_804_800_000, 1_700_000_000_123] {
            let iso = timestamp_to_iso8601(ts);
            assert_eq!(iso8601_to_timestamp(&iso).unwrap(), ts);
        }
        assert_eq!(
            timestamp_to_iso8601(1_609_804_800_000),
            "2021-01-05T00:00:00.000Z"
        );
    }

    #[test]
    fn iso8601_rejects_malformed() {
        assert!(iso8601_to_timestamp("2021-01-05 00:00:00").is_err());
        assert!(iso8601_to_timestamp("2021-01-05T00:00:00.000").is_err());
        assert!(iso8601_to_timestamp("not-a-date").is_err());
    }

    #[test]
    fn date_and_time_forms() {
        assert_eq!(timestamp_to_date(1_609_804_800_000), "2021-01-05");
        assert_eq!(timestamp_to_time(1_609_804_800_000), "2021-01-05 00:00:00");
    }

    #[test]
    fn day_difference_is_absolute() {
        let a = timestamp_to_datetime(0);
        let b = timestamp_to_datetime(3 * 86_400_000);
        assert_eq!(date_diff_in_days(a, b), 3);
        assert_eq!(date_diff_in_days(b, a), 3);
    }

    #[test]
    fn candle_timestamp_arithmetic() {
        assert_eq!(
            next_candle_timestamp(1_700_000_000_000 - 1_700_000_000_000 % 3_600_000, Timeframe::Hour1),
            1_700_000_000_000 - 1_700_000_000_000 % 3_600_000 + 3_600_000
        );
        let ts = current_1m_candle_timestamp();
        assert_eq!(ts % ONE_MINUTE_MS, 0);
    }

    #[test]
    fn readable_durations() {
        assert_eq!(readable_duration(90, 2), "1 minute, 30 seconds");
        assert_eq!(readable_duration(604_800 + 3_600, 2), "1 week, 1 hour");
        assert_eq!(readable_duration(3 * 86_400 + 2 * 3_600 + 60, 2), "3 days, 2 hours");
        assert_eq!(readable_duration(59, 3), "59 seconds");
        assert_eq!(readable_duration(0, 2), "");
    }
}
