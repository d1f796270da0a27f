use crate::{error::DataError, ring::RingMatrix};
use cipher_instrument::{Side, exchange::ExchangeId, key::generate_composite_key};
use fnv::FnvHashMap;
use parking_lot::RwLock;

/// Trade matrix columns:
/// `[timestamp, price, buy_qty, sell_qty, buy_count, sell_count]`.
pub const TRADE_COLS: usize = 6;

/// Public-trade flow aggregated into one row per minute per
/// `(exchange, symbol)`.
#[derive(Debug, Default)]
pub struct TradeStore {
    slots: FnvHashMap<String, RwLock<RingMatrix>>,
}

impl TradeStore {
    pub fn add_slot(&mut self, exchange: ExchangeId, symbol: &str) {
        let key = generate_composite_key(exchange, symbol, None);
        self.slots
            .entry(key)
            .or_insert_with(|| RwLock::new(RingMatrix::new(60, TRADE_COLS, 120)));
    }

    fn slot(&self, exchange: ExchangeId, symbol: &str) -> Result<&RwLock<RingMatrix>, DataError> {
        let key = generate_composite_key(exchange, symbol, None);
        self.slots.get(&key).ok_or(DataError::UnknownSymbol(key))
    }

    /// Fold one public trade into its minute bucket.
    pub fn add_trade(
        &self,
        exchange: ExchangeId,
        symbol: &str,
        timestamp: i64,
        price: f64,
        qty: f64,
        side: Side,
    ) -> Result<(), DataError> {
        let slot = self.slot(exchange, symbol)?;
        let mut trades = slot.write();
        let bucket = (timestamp - timestamp.rem_euclid(60_000)) as f64;

        let (buy_qty, sell_qty, buy_count, sell_count) = match side {
            Side::Buy => (qty, 0.0, 1.0, 0.0),
            Side::Sell => (0.0, qty, 0.0, 1.0),
        };

        let newest: Option<[f64; TRADE_COLS]> = trades.last().ok().map(|last| {
            let mut out = [0.0; TRADE_COLS];
            out.copy_from_slice(last);
            out
        });
        match newest {
            Some(last) if last[0] == bucket => {
                let merged = [
                    bucket,
                    price,
                    last[2] + buy_qty,
                    last[3] + sell_qty,
                    last[4] + buy_count,
                    last[5] + sell_count,
                ];
                trades.replace_last(&merged)
            }
            Some(last) if last[0] > bucket => Ok(()),
            _ => trades.append(&[bucket, price, buy_qty, sell_qty, buy_count, sell_count]),
        }
    }

    /// The newest minute aggregate.
    pub fn current_trade(
        &self,
        exchange: ExchangeId,
        symbol: &str,
    ) -> Result<[f64; TRADE_COLS], DataError> {
        let slot = self.slot(exchange, symbol)?;
        let trades = slot.read();
        let row = trades.last()?;
        let mut out = [0.0; TRADE_COLS];
        out.copy_from_slice(row);
        Ok(out)
    }
}
