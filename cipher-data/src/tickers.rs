use crate::{error::DataError, ring::RingMatrix};
use cipher_instrument::{exchange::ExchangeId, key::generate_composite_key};
use fnv::FnvHashMap;
use parking_lot::RwLock;

/// Ticker matrix columns:
/// `[timestamp, last_price, volume, high_price, low_price]`.
pub const TICKER_COLS: usize = 5;

/// How far back [`TickerStore::past_ticker`] may reach.
pub const MAX_PAST_TICKERS: usize = 120;

/// Bounded ticker history per `(exchange, symbol)`.
///
/// Updates are throttled to 1 Hz: a ticker arriving less than a second after
/// the newest stored one is ignored.
#[derive(Debug, Default)]
pub struct TickerStore {
    slots: FnvHashMap<String, RwLock<RingMatrix>>,
}

impl TickerStore {
    pub fn add_slot(&mut self, exchange: ExchangeId, symbol: &str) {
        let key = generate_composite_key(exchange, symbol, None);
        self.slots
            .entry(key)
            .or_insert_with(|| RwLock::new(RingMatrix::new(60, TICKER_COLS, MAX_PAST_TICKERS)));
    }

    fn slot(&self, exchange: ExchangeId, symbol: &str) -> Result<&RwLock<RingMatrix>, DataError> {
        let key = generate_composite_key(exchange, symbol, None);
        self.slots.get(&key).ok_or(DataError::UnknownSymbol(key))
    }

    /// Append a ticker row unless one arrived within the last second.
    pub fn add_ticker(
        &self,
        exchange: ExchangeId,
        symbol: &str,
        row: [f64; TICKER_COLS],
    ) -> Result<(), DataError> {
        let slot = self.slot(exchange, symbol)?;
        let mut tickers = slot.write();

        if let Ok(last) = tickers.last()
            && row[0] - last[0] < 1_000.0
        {
            return Ok(());
        }
        tickers.append(&row)
    }

    /// The newest ticker.
    pub fn current_ticker(
        &self,
        exchange: ExchangeId,
        symbol: &str,
    ) -> Result<[f64; TICKER_COLS], DataError> {
        self.past_ticker(exchange, symbol, 0)
    }

    /// The ticker `n` rows before the newest; `n` may not exceed
    /// [`MAX_PAST_TICKERS`].
    pub fn past_ticker(
        &self,
        exchange: ExchangeId,
        symbol: &str,
        n: usize,
    ) -> Result<[f64; TICKER_COLS], DataError> {
        if n > MAX_PAST_TICKERS {
            return Err(DataError::OutOfRange(n as i64));
        }
        let slot = self.slot(exchange, symbol)?;
        let tickers = slot.read();
        let row = tickers.row(-1 - n as i64)?;
        let mut out = [0.0; TICKER_COLS];
        out.copy_from_slice(row);
        Ok(out)
    }

    /// Snapshot of the whole stored history, oldest first.
    pub fn tickers(
        &self,
        exchange: ExchangeId,
        symbol: &str,
    ) -> Result<Vec<[f64; TICKER_COLS]>, DataError> {
        let slot = self.slot(exchange, symbol)?;
        let tickers = slot.read();
        let size = tickers.size() as i64;
        let view = tickers.rows(0, size)?;
        Ok(view
            .iter()
            .map(|row| {
                let mut out = [0.0; TICKER_COLS];
                out.copy_from_slice(row);
                out
            })
            .collect())
    }

    /// Number of tickers currently stored for a slot.
    pub fn len(&self, exchange: ExchangeId, symbol: &str) -> Result<usize, DataError> {
        Ok(self.slot(exchange, symbol)?.read().size())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> TickerStore {
        let mut store = TickerStore::default();
        store.add_slot(ExchangeId::BinanceSpot, "BTC-USDT");
        store
    }

    fn ticker(ts: i64, price: f64) -> [f64; TICKER_COLS] {
        [ts as f64, price, 1.0, price + 1.0, price - 1.0]
    }

    #[test]
    fn sub_second_updates_are_throttled() {
        let store = store();
        store
            .add_ticker(ExchangeId::BinanceSpot, "BTC-USDT", ticker(10_000, 100.0))
            .unwrap();
        // 400 ms later: ignored.
        store
            .add_ticker(ExchangeId::BinanceSpot, "BTC-USDT", ticker(10_400, 101.0))
            .unwrap();
        assert_eq!(store.len(ExchangeId::BinanceSpot, "BTC-USDT").unwrap(), 1);

        // A full second later: appended.
        store
            .add_ticker(ExchangeId::BinanceSpot, "BTC-USDT", ticker(11_000, 102.0))
            .unwrap();
        assert_eq!(store.len(ExchangeId::BinanceSpot, "BTC-USDT").unwrap(), 2);
        assert_eq!(
            store
                .current_ticker(ExchangeId::BinanceSpot, "BTC-USDT")
                .unwrap()[1],
            102.0
        );
    }

    #[test]
    fn past_ticker_bounds() {
        let store = store();
        for i in 0..3 {
            store
                .add_ticker(
                    ExchangeId::BinanceSpot,
                    "BTC-USDT",
                    ticker(i * 1_000, 100.0 + i as f64),
                )
                .unwrap();
        }
        assert_eq!(
            store
                .past_ticker(ExchangeId::BinanceSpot, "BTC-USDT", 1)
                .unwrap()[1],
            101.0
        );
        assert!(matches!(
            store.past_ticker(ExchangeId::BinanceSpot, "BTC-USDT", 121),
            Err(DataError::OutOfRange(121))
        ));
        // Within the cap but beyond stored history.
        assert!(
            store
                .past_ticker(ExchangeId::BinanceSpot, "BTC-USDT", 10)
                .is_err()
        );
    }

    #[test]
    fn unknown_symbol_fails() {
        let store = store();
        assert!(matches!(
            store.current_ticker(ExchangeId::BinanceSpot, "DOGE-USDT"),
            Err(DataError::UnknownSymbol(_))
        ));
    }
}
