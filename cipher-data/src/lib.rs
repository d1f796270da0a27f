#![forbid(unsafe_code)]
#![warn(
    unused,
    clippy::cognitive_complexity,
    unused_crate_dependencies,
    unused_extern_crates,
    clippy::unused_self,
    clippy::useless_let_if_seq,
    missing_debug_implementations,
    rust_2018_idioms,
    rust_2024_compatibility
)]
#![allow(clippy::type_complexity, clippy::too_many_arguments)]

//! # Cipher-Data
//! Bounded, time-keyed market-data state for Cipher Trader: the ring store
//! underpinning candle/ticker/orderbook/trade histories, the per-key
//! repositories built on it, and the route registry that seeds them.

/// Candle repository with 1m-to-higher-timeframe aggregation.
pub mod candles;

/// Errors raised by ring storage and repositories.
pub mod error;

/// Orderbook snapshot repository.
pub mod orderbook;

/// Append-only, drop-when-full 2-D numeric store.
pub mod ring;

/// Route registry binding (exchange, symbol, timeframe) tuples to strategies.
pub mod route;

/// Per-key bounded ticker history with 1 Hz throttling.
pub mod tickers;

/// Per-minute trade aggregation.
pub mod trades;

use crate::{
    candles::CandleStore, orderbook::OrderbookStore, route::Router, tickers::TickerStore,
    trades::TradeStore,
};

/// All market-data repositories for one engine run.
///
/// Slots are created once from the router; ingest threads write and strategy
/// threads read through per-key locks.
#[derive(Debug, Default)]
pub struct MarketDataState {
    pub candles: CandleStore,
    pub tickers: TickerStore,
    pub orderbook: OrderbookStore,
    pub trades: TradeStore,
}

impl MarketDataState {
    pub fn new(warmup_candles: usize) -> Self {
        Self {
            candles: CandleStore::new(warmup_candles),
            tickers: TickerStore::default(),
            orderbook: OrderbookStore::default(),
            trades: TradeStore::default(),
        }
    }

    /// Create one slot per route in every repository.
    pub fn init(&mut self, router: &Router) {
        for route in router.all_routes() {
            self.candles
                .add_slot(route.exchange, &route.symbol, route.timeframe);
            self.tickers.add_slot(route.exchange, &route.symbol);
            self.orderbook.add_slot(route.exchange, &route.symbol);
            self.trades.add_slot(route.exchange, &route.symbol);
        }
    }
}
