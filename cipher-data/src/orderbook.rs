use crate::{error::DataError, ring::RingMatrix};
use cipher_instrument::{exchange::ExchangeId, key::generate_composite_key};
use fnv::FnvHashMap;
use parking_lot::RwLock;

/// Orderbook matrix columns:
/// `[timestamp, best_bid_price, best_bid_qty, best_ask_price, best_ask_qty]`.
pub const ORDERBOOK_COLS: usize = 5;

/// Best-of-book history per `(exchange, symbol)`, one row per update.
#[derive(Debug, Default)]
pub struct OrderbookStore {
    slots: FnvHashMap<String, RwLock<RingMatrix>>,
}

/// One price ladder side as received from an adapter: `[[price, qty], ...]`,
/// best level first.
pub type Ladder = Vec<[f64; 2]>;

impl OrderbookStore {
    pub fn add_slot(&mut self, exchange: ExchangeId, symbol: &str) {
        let key = generate_composite_key(exchange, symbol, None);
        self.slots
            .entry(key)
            .or_insert_with(|| RwLock::new(RingMatrix::new(50, ORDERBOOK_COLS, 60)));
    }

    fn slot(&self, exchange: ExchangeId, symbol: &str) -> Result<&RwLock<RingMatrix>, DataError> {
        let key = generate_composite_key(exchange, symbol, None);
        self.slots.get(&key).ok_or(DataError::UnknownSymbol(key))
    }

    /// Parse serialized bid/ask ladders and append the top of book.
    ///
    /// Ladders arrive as JSON arrays of `[price, qty]` pairs, best level
    /// first; only the best level is retained.
    pub fn add_orderbook(
        &self,
        exchange: ExchangeId,
        symbol: &str,
        timestamp: i64,
        bids_json: &str,
        asks_json: &str,
    ) -> Result<(), DataError> {
        let bids: Ladder = serde_json::from_str(bids_json)
            .map_err(|e| DataError::InvalidOrderbook(e.to_string()))?;
        let asks: Ladder = serde_json::from_str(asks_json)
            .map_err(|e| DataError::InvalidOrderbook(e.to_string()))?;

        let best_bid = bids
            .first()
            .ok_or_else(|| DataError::InvalidOrderbook("empty bid ladder".to_string()))?;
        let best_ask = asks
            .first()
            .ok_or_else(|| DataError::InvalidOrderbook("empty ask ladder".to_string()))?;

        let slot = self.slot(exchange, symbol)?;
        slot.write().append(&[
            timestamp as f64,
            best_bid[0],
            best_bid[1],
            best_ask[0],
            best_ask[1],
        ])
    }

    /// The newest best-of-book row.
    pub fn current_orderbook(
        &self,
        exchange: ExchangeId,
        symbol: &str,
    ) -> Result<[f64; ORDERBOOK_COLS], DataError> {
        let slot = self.slot(exchange, symbol)?;
        let book = slot.read();
        let row = book.last()?;
        let mut out = [0.0; ORDERBOOK_COLS];
        out.copy_from_slice(row);
        Ok(out)
    }

    /// Best bid as `(price, qty)`.
    pub fn best_bid(&self, exchange: ExchangeId, symbol: &str) -> Result<(f64, f64), DataError> {
        let row = self.current_orderbook(exchange, symbol)?;
        Ok((row[1], row[2]))
    }

    /// Best ask as `(price, qty)`.
    pub fn best_ask(&self, exchange: ExchangeId, symbol: &str) -> Result<(f64, f64), DataError> {
        let row = self.current_orderbook(exchange, symbol)?;
        Ok((row[3], row[4]))
    }
}
