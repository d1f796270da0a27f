use crate::{engine::Engine, error::EngineError};
use cipher_data::route::Route;
use cipher_instrument::{Side, order::OrderType, timeframe::Timeframe};
use cipher_execution::order::CancelSource;
use uuid::Uuid;

/// A trading strategy: one `execute` per candle close.
///
/// Strategies are plain values bound to routes on the engine; construction
/// and loading live outside the core.
pub trait Strategy: Send {
    fn name(&self) -> &str;

    /// One tick against current market state.
    fn execute(&mut self, ctx: &mut StrategyContext<'_>) -> Result<(), EngineError>;
}

/// Per-tick view handed to a strategy: read access to its route's market
/// data plus order entry on its venue.
#[derive(Debug)]
pub struct StrategyContext<'a> {
    engine: &'a mut Engine,
    route: Route,
}

impl<'a> StrategyContext<'a> {
    pub(crate) fn new(engine: &'a mut Engine, route: Route) -> Self {
        Self { engine, route }
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn timeframe(&self) -> Timeframe {
        self.route.timeframe.unwrap_or(Timeframe::Minute1)
    }

    /// Mode-driven current time in epoch milliseconds.
    pub fn now_ms(&self) -> i64 {
        self.engine.now_ms()
    }

    /// Snapshot of the route's candle history, oldest first.
    pub fn candles(&self) -> Result<Vec<[f64; 6]>, EngineError> {
        Ok(self.engine.market_data().candles.candles(
            self.route.exchange,
            &self.route.symbol,
            self.timeframe(),
        )?)
    }

    pub fn current_candle(&self) -> Result<[f64; 6], EngineError> {
        Ok(self.engine.market_data().candles.current_candle(
            self.route.exchange,
            &self.route.symbol,
            self.timeframe(),
        )?)
    }

    pub fn current_ticker(&self) -> Result<[f64; 5], EngineError> {
        Ok(self
            .engine
            .market_data()
            .tickers
            .current_ticker(self.route.exchange, &self.route.symbol)?)
    }

    /// Current price: the latest ticker's last price.
    pub fn price(&self) -> Result<f64, EngineError> {
        Ok(self.current_ticker()?[1])
    }

    pub fn best_bid(&self) -> Result<(f64, f64), EngineError> {
        Ok(self
            .engine
            .market_data()
            .orderbook
            .best_bid(self.route.exchange, &self.route.symbol)?)
    }

    pub fn best_ask(&self) -> Result<(f64, f64), EngineError> {
        Ok(self
            .engine
            .market_data()
            .orderbook
            .best_ask(self.route.exchange, &self.route.symbol)?)
    }

    /// Balance of `asset` on the route's venue.
    pub fn asset(&self, asset: &str) -> Result<f64, EngineError> {
        Ok(self.engine.exchange(self.route.exchange)?.asset(asset))
    }

    pub fn wallet_balance(&self) -> Result<f64, EngineError> {
        Ok(self.engine.exchange(self.route.exchange)?.wallet_balance())
    }

    pub fn available_margin(&self) -> Result<f64, EngineError> {
        Ok(self
            .engine
            .exchange(self.route.exchange)?
            .available_margin())
    }

    pub fn market_order(&mut self, side: Side, qty: f64) -> Result<Uuid, EngineError> {
        self.submit(side, OrderType::Market, qty, None, false)
    }

    pub fn limit_order(&mut self, side: Side, qty: f64, price: f64) -> Result<Uuid, EngineError> {
        self.submit(side, OrderType::Limit, qty, Some(price), false)
    }

    pub fn stop_order(&mut self, side: Side, qty: f64, price: f64) -> Result<Uuid, EngineError> {
        self.submit(side, OrderType::Stop, qty, Some(price), false)
    }

    /// Reduce-only variant for closing out futures exposure.
    pub fn reduce_order(
        &mut self,
        side: Side,
        order_type: OrderType,
        qty: f64,
        price: Option<f64>,
    ) -> Result<Uuid, EngineError> {
        self.submit(side, order_type, qty, price, true)
    }

    pub fn cancel_order(&mut self, id: Uuid) -> Result<(), EngineError> {
        self.engine.cancel_order(id, CancelSource::Strategy)
    }

    fn submit(
        &mut self,
        side: Side,
        order_type: OrderType,
        qty: f64,
        price: Option<f64>,
        reduce_only: bool,
    ) -> Result<Uuid, EngineError> {
        let exchange = self.route.exchange;
        let symbol = self.route.symbol.clone();
        self.engine
            .submit_order(exchange, &symbol, side, order_type, qty, price, reduce_only)
    }
}
