use crate::{error::DataError, ring::RingMatrix};
use cipher_instrument::{
    exchange::ExchangeId, key::generate_composite_key, time::ONE_MINUTE_MS, timeframe::Timeframe,
};
use fnv::FnvHashMap;
use parking_lot::RwLock;
use tracing::warn;

/// Candle matrix columns: `[timestamp, open, close, high, low, volume]`.
pub const CANDLE_COLS: usize = 6;

/// Candle histories per `(exchange, symbol, timeframe)` slot.
///
/// One-minute updates also roll up into every higher-timeframe slot of the
/// same market, merging into the forming candle until its bucket closes.
#[derive(Debug)]
pub struct CandleStore {
    slots: FnvHashMap<String, RwLock<RingMatrix>>,
    drop_at: usize,
}

impl Default for CandleStore {
    fn default() -> Self {
        Self::new(210)
    }
}

impl CandleStore {
    /// `warmup_candles` sizes history retention, rounded up to a whole
    /// 240-row block.
    pub fn new(warmup_candles: usize) -> Self {
        let blocks = warmup_candles.div_ceil(240).max(1);
        Self {
            slots: FnvHashMap::default(),
            drop_at: blocks * 240,
        }
    }

    pub fn add_slot(&mut self, exchange: ExchangeId, symbol: &str, timeframe: Option<Timeframe>) {
        let key = generate_composite_key(exchange, symbol, timeframe);
        self.slots
            .entry(key)
            .or_insert_with(|| RwLock::new(RingMatrix::new(240, CANDLE_COLS, self.drop_at)));
    }

    fn slot(
        &self,
        exchange: ExchangeId,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<&RwLock<RingMatrix>, DataError> {
        let key = generate_composite_key(exchange, symbol, Some(timeframe));
        self.slots
            .get(&key)
            .ok_or(DataError::UnknownSymbol(key))
    }

    /// Append or merge one candle row into its slot.
    ///
    /// A row whose timestamp matches the newest stored row replaces it (the
    /// forming candle was updated); a newer timestamp appends. Stale rows are
    /// dropped so per-key timestamps stay monotonic.
    pub fn add_candle(
        &self,
        exchange: ExchangeId,
        symbol: &str,
        timeframe: Timeframe,
        row: [f64; CANDLE_COLS],
    ) -> Result<(), DataError> {
        let slot = self.slot(exchange, symbol, timeframe)?;
        let mut candles = slot.write();

        let newest_ts = candles.last().ok().map(|last| last[0]);
        match newest_ts {
            Some(newest) if row[0] < newest => {
                warn!(
                    exchange = %exchange,
                    symbol,
                    timeframe = %timeframe,
                    stale_ts = row[0],
                    newest_ts = newest,
                    "dropping out-of-order candle"
                );
                Ok(())
            }
            Some(newest) if row[0] == newest => candles.replace_last(&row),
            _ => candles.append(&row),
        }
    }

    /// Ingest a closed or forming one-minute candle and roll it up into
    /// every higher-timeframe slot of the same market.
    pub fn add_one_minute_candle(
        &self,
        exchange: ExchangeId,
        symbol: &str,
        row: [f64; CANDLE_COLS],
    ) -> Result<(), DataError> {
        self.add_candle(exchange, symbol, Timeframe::Minute1, row)?;

        for timeframe in Timeframe::all() {
            if *timeframe == Timeframe::Minute1 {
                continue;
            }
            let key = generate_composite_key(exchange, symbol, Some(*timeframe));
            let Some(slot) = self.slots.get(&key) else {
                continue;
            };
            let mut candles = slot.write();
            let bucket = row[0] - row[0].rem_euclid(timeframe.millis() as f64);

            let newest: Option<[f64; CANDLE_COLS]> = candles.last().ok().map(|last| {
                let mut out = [0.0; CANDLE_COLS];
                out.copy_from_slice(last);
                out
            });
            match newest {
                Some(last) if last[0] == bucket => {
                    // Merge into the forming candle.
                    let merged = [
                        bucket,
                        last[1],
                        row[2],
                        last[3].max(row[3]),
                        last[4].min(row[4]),
                        last[5] + row[5],
                    ];
                    candles.replace_last(&merged)?;
                }
                Some(last) if last[0] > bucket => {}
                _ => {
                    candles.append(&[bucket, row[1], row[2], row[3], row[4], row[5]])?;
                }
            }
        }
        Ok(())
    }

    /// The newest candle of a slot.
    pub fn current_candle(
        &self,
        exchange: ExchangeId,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<[f64; CANDLE_COLS], DataError> {
        self.past_candle(exchange, symbol, timeframe, 0)
    }

    /// The candle `n` rows before the newest.
    pub fn past_candle(
        &self,
        exchange: ExchangeId,
        symbol: &str,
        timeframe: Timeframe,
        n: usize,
    ) -> Result<[f64; CANDLE_COLS], DataError> {
        let slot = self.slot(exchange, symbol, timeframe)?;
        let candles = slot.read();
        let row = candles.row(-1 - n as i64)?;
        let mut out = [0.0; CANDLE_COLS];
        out.copy_from_slice(row);
        Ok(out)
    }

    /// Snapshot of the whole stored history, oldest first.
    pub fn candles(
        &self,
        exchange: ExchangeId,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<Vec<[f64; CANDLE_COLS]>, DataError> {
        let slot = self.slot(exchange, symbol, timeframe)?;
        let candles = slot.read();
        let size = candles.size() as i64;
        let view = candles.rows(0, size)?;
        Ok(view
            .iter()
            .map(|row| {
                let mut out = [0.0; CANDLE_COLS];
                out.copy_from_slice(row);
                out
            })
            .collect())
    }

    /// Number of candles currently stored for a slot.
    pub fn len(
        &self,
        exchange: ExchangeId,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<usize, DataError> {
        Ok(self.slot(exchange, symbol, timeframe)?.read().size())
    }
}

/// True when `timestamp` opens a fresh `timeframe` bucket.
pub fn is_bucket_open(timestamp: i64, timeframe: Timeframe) -> bool {
    timestamp % timeframe.millis() == 0
}

/// Timestamp of the one-minute bucket containing `timestamp`.
pub fn one_minute_bucket(timestamp: i64) -> i64 {
    timestamp - timestamp.rem_euclid(ONE_MINUTE_MS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> CandleStore {
        let mut store = CandleStore::new(210);
        store.add_slot(ExchangeId::BinanceSpot, "BTC-USDT", Some(Timeframe::Minute1));
        store.add_slot(ExchangeId::BinanceSpot, "BTC-USDT", Some(Timeframe::Hour1));
        store
    }

    fn minute(ts: i64, open: f64, close: f64, high: f64, low: f64, vol: f64) -> [f64; 6] {
        [ts as f64, open, close, high, low, vol]
    }

    #[test]
    fn unknown_slot_fails() {
        let store = store();
        assert!(matches!(
            store.current_candle(ExchangeId::BinanceSpot, "DOGE-USDT", Timeframe::Minute1),
            Err(DataError::UnknownSymbol(_))
        ));
    }

    #[test]
    fn same_timestamp_replaces_forming_candle() {
        let store = store();
        store
            .add_candle(
                ExchangeId::BinanceSpot,
                "BTC-USDT",
                Timeframe::Minute1,
                minute(60_000, 100.0, 101.0, 102.0, 99.0, 5.0),
            )
            .unwrap();
        store
            .add_candle(
                ExchangeId::BinanceSpot,
                "BTC-USDT",
                Timeframe::Minute1,
                minute(60_000, 100.0, 103.0, 104.0, 99.0, 7.0),
            )
            .unwrap();

        assert_eq!(
            store
                .len(ExchangeId::BinanceSpot, "BTC-USDT", Timeframe::Minute1)
                .unwrap(),
            1
        );
        let current = store
            .current_candle(ExchangeId::BinanceSpot, "BTC-USDT", Timeframe::Minute1)
            .unwrap();
        assert_eq!(current[2], 103.0);
    }

    #[test]
    fn stale_candle_is_dropped() {
        let store = store();
        for ts in [120_000, 60_000] {
            store
                .add_candle(
                    ExchangeId::BinanceSpot,
                    "BTC-USDT",
                    Timeframe::Minute1,
                    minute(ts, 1.0, 1.0, 1.0, 1.0, 1.0),
                )
                .unwrap();
        }
        assert_eq!(
            store
                .len(ExchangeId::BinanceSpot, "BTC-USDT", Timeframe::Minute1)
                .unwrap(),
            1
        );
    }

    #[test]
    fn one_minute_rolls_up_to_hourly() {
        let store = store();
        // Three minutes inside the same hourly bucket.
        store
            .add_one_minute_candle(
                ExchangeId::BinanceSpot,
                "BTC-USDT",
                minute(3_600_000, 100.0, 101.0, 102.0, 99.0, 1.0),
            )
            .unwrap();
        store
            .add_one_minute_candle(
                ExchangeId::BinanceSpot,
                "BTC-USDT",
                minute(3_660_000, 101.0, 105.0, 106.0, 100.0, 2.0),
            )
            .unwrap();
        store
            .add_one_minute_candle(
                ExchangeId::BinanceSpot,
                "BTC-USDT",
                minute(3_720_000, 105.0, 103.0, 105.5, 98.0, 3.0),
            )
            .unwrap();

        let hourly = store
            .current_candle(ExchangeId::BinanceSpot, "BTC-USDT", Timeframe::Hour1)
            .unwrap();
        assert_eq!(hourly, [3_600_000.0, 100.0, 103.0, 106.0, 98.0, 6.0]);

        // The next hour opens a fresh bucket.
        store
            .add_one_minute_candle(
                ExchangeId::BinanceSpot,
                "BTC-USDT",
                minute(7_200_000, 103.0, 104.0, 104.0, 103.0, 1.0),
            )
            .unwrap();
        assert_eq!(
            store
                .len(ExchangeId::BinanceSpot, "BTC-USDT", Timeframe::Hour1)
                .unwrap(),
            2
        );
    }

    #[test]
    fn bucket_helpers() {
        assert!(is_bucket_open(3_600_000, Timeframe::Hour1));
        assert!(!is_bucket_open(3_660_000, Timeframe::Hour1));
        assert_eq!(one_minute_bucket(61_234), 60_000);
    }
}
