use crate::{
    clock::{EngineClock, StoreClock, clock_for_mode},
    config::{Config, LogEvent},
    error::EngineError,
    mode::TradingMode,
    strategy::{Strategy, StrategyContext},
};
use cipher_data::{MarketDataState, route::Router};
use cipher_execution::{
    error::ExecutionError,
    exchange::{Exchange, FuturesExchange, SpotExchange},
    notify::{NoopNotifier, Notifier},
    order::{CancelSource, Order, builder::OrderBuilder},
};
use cipher_instrument::{
    Side,
    exchange::{ExchangeId, ExchangeKind},
    info::exchange_info,
    key::generate_composite_key,
    order::{OrderStatus, OrderType},
    side_to_type,
    time::next_candle_timestamp,
    timeframe::Timeframe,
};
use cipher_store::{Database, entity};
use cipher_store::entity::trading::ClosedTrade;
use fnv::FnvHashMap;
use serde::Deserialize;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Paper balance every simulator starts with.
pub const DEFAULT_STARTING_BALANCE: f64 = 10_000.0;

/// Order event pushed by an exchange adapter stream.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderUpdate {
    pub id: Uuid,
    pub status: OrderStatus,
    pub filled_qty: f64,
    pub exchange_id: Option<String>,
    /// Fill price when the venue reports one; limit orders fall back to
    /// their submission price.
    pub price: Option<f64>,
}

/// Ticker event pushed by an exchange adapter stream.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TickerUpdate {
    pub timestamp: i64,
    pub last_price: f64,
    pub volume: f64,
    pub high: f64,
    pub low: f64,
}

/// The composition root owned by `main`.
///
/// One engine value holds the route registry, market-data state, exchange
/// simulators, in-flight order book, strategies, clock and store handle;
/// nothing in the core is process-global.
pub struct Engine {
    config: Config,
    mode: TradingMode,
    clock: Box<dyn EngineClock>,
    /// Writable handle onto the frozen backtest clock, absent in live modes.
    store_clock: Option<StoreClock>,
    router: Router,
    market_data: MarketDataState,
    exchanges: FnvHashMap<ExchangeId, Box<dyn Exchange>>,
    strategies: FnvHashMap<String, Box<dyn Strategy>>,
    orders: FnvHashMap<Uuid, Order>,
    open_trades: FnvHashMap<String, ClosedTrade>,
    notifier: Box<dyn Notifier>,
    database: Option<Database>,
    session_id: Uuid,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("mode", &self.mode)
            .field("session_id", &self.session_id)
            .field("orders", &self.orders.len())
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Build the engine for an initialised router: one market-data slot per
    /// route and one simulator per distinct venue.
    pub fn new(config: Config, router: Router) -> Self {
        let mode = config.app_trading_mode;
        let (clock, store_clock): (Box<dyn EngineClock>, Option<StoreClock>) =
            if mode.is_backtesting() {
                let store_clock = StoreClock::default();
                (Box::new(store_clock.clone()), Some(store_clock))
            } else {
                (clock_for_mode(mode), None)
            };

        let mut market_data = MarketDataState::new(config.env_data_warmup_candles_num);
        market_data.init(&router);

        let mut exchanges: FnvHashMap<ExchangeId, Box<dyn Exchange>> = FnvHashMap::default();
        for route in router.all_routes() {
            exchanges.entry(route.exchange).or_insert_with(|| {
                build_exchange(route.exchange, &config, mode)
            });
        }

        Self {
            config,
            mode,
            clock,
            store_clock,
            router,
            market_data,
            exchanges,
            strategies: FnvHashMap::default(),
            orders: FnvHashMap::default(),
            open_trades: FnvHashMap::default(),
            notifier: Box::new(NoopNotifier),
            database: None,
            session_id: Uuid::new_v4(),
        }
    }

    pub fn with_database(mut self, database: Database) -> Self {
        self.database = Some(database);
        self
    }

    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn mode(&self) -> TradingMode {
        self.mode
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn market_data(&self) -> &MarketDataState {
        &self.market_data
    }

    /// Mode-driven current time: wall clock live, frozen candle close in
    /// backtests.
    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    pub fn exchange(&self, id: ExchangeId) -> Result<&dyn Exchange, EngineError> {
        self.exchanges
            .get(&id)
            .map(|exchange| exchange.as_ref())
            .ok_or(EngineError::UnknownExchange(id))
    }

    pub fn order(&self, id: Uuid) -> Option<&Order> {
        self.orders.get(&id)
    }

    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.values()
    }

    /// Bind a strategy to the trading route at `index`.
    pub fn bind_strategy(
        &mut self,
        index: usize,
        strategy: Box<dyn Strategy>,
    ) -> Result<(), EngineError> {
        let route = self
            .router
            .get(index)
            .ok_or_else(|| EngineError::UnknownStrategy(format!("route index {index}")))?;
        let key = generate_composite_key(route.exchange, &route.symbol, route.timeframe);
        self.strategies.insert(key, strategy);
        Ok(())
    }

    /// One tick: every bound strategy runs once against current state.
    ///
    /// A strategy error abandons that strategy's tick and the cycle
    /// continues; the engine keeps running.
    pub fn run_cycle(&mut self) {
        let keys: Vec<String> = self.strategies.keys().cloned().collect();
        for key in keys {
            let Some(mut strategy) = self.strategies.remove(&key) else {
                continue;
            };
            let route = self
                .router
                .routes()
                .iter()
                .find(|route| {
                    generate_composite_key(route.exchange, &route.symbol, route.timeframe) == key
                })
                .cloned();

            if let Some(route) = route {
                let mut ctx = StrategyContext::new(self, route);
                if let Err(e) = strategy.execute(&mut ctx) {
                    error!(strategy = strategy.name(), error = %e, "tick abandoned");
                }
            }
            self.strategies.insert(key, strategy);
        }
    }

    // ---- ingest -----------------------------------------------------------

    pub fn on_ticker_update(
        &mut self,
        exchange: ExchangeId,
        symbol: &str,
        update: TickerUpdate,
    ) -> Result<(), EngineError> {
        let symbol = self.config.dashy_symbol(symbol);
        self.market_data.tickers.add_ticker(
            exchange,
            &symbol,
            [
                update.timestamp as f64,
                update.last_price,
                update.volume,
                update.high,
                update.low,
            ],
        )?;
        Ok(())
    }

    /// Ingest one candle row; 1m rows roll up into the higher timeframes
    /// and, in backtests, advance the frozen clock to the candle's close.
    pub fn on_candle_update(
        &mut self,
        exchange: ExchangeId,
        symbol: &str,
        timeframe: Timeframe,
        row: [f64; 6],
    ) -> Result<(), EngineError> {
        let symbol = self.config.dashy_symbol(symbol);
        if timeframe == Timeframe::Minute1 {
            self.market_data
                .candles
                .add_one_minute_candle(exchange, &symbol, row)?;
        } else {
            self.market_data
                .candles
                .add_candle(exchange, &symbol, timeframe, row)?;
        }

        if let Some(store_clock) = &self.store_clock {
            store_clock.advance(next_candle_timestamp(row[0] as i64, timeframe));
        }
        Ok(())
    }

    pub fn on_orderbook_update(
        &mut self,
        exchange: ExchangeId,
        symbol: &str,
        timestamp: i64,
        bids_json: &str,
        asks_json: &str,
    ) -> Result<(), EngineError> {
        let symbol = self.config.dashy_symbol(symbol);
        self.market_data
            .orderbook
            .add_orderbook(exchange, &symbol, timestamp, bids_json, asks_json)?;
        Ok(())
    }

    pub fn on_trade_update(
        &mut self,
        exchange: ExchangeId,
        symbol: &str,
        timestamp: i64,
        price: f64,
        qty: f64,
        side: Side,
    ) -> Result<(), EngineError> {
        let symbol = self.config.dashy_symbol(symbol);
        self.market_data
            .trades
            .add_trade(exchange, &symbol, timestamp, price, qty, side)?;
        Ok(())
    }

    /// Dispatch one order event from the exchange stream.
    pub fn on_order_update(&mut self, update: OrderUpdate) -> Result<(), EngineError> {
        let now = self.now_ms();
        let mut order = self
            .orders
            .remove(&update.id)
            .ok_or(EngineError::UnknownOrder(update.id))?;

        if let Some(exchange_id) = &update.exchange_id {
            order.exchange_id = Some(exchange_id.clone());
        }

        let result = match update.status {
            OrderStatus::Executed => {
                let fill_qty = order.qty.abs() - order.filled_qty;
                self.apply_fill(&mut order, fill_qty, update.price, now)
            }
            OrderStatus::PartiallyFilled => {
                let fill_qty = update.filled_qty - order.filled_qty;
                self.apply_fill(&mut order, fill_qty, update.price, now)
            }
            OrderStatus::Canceled => self.apply_cancel(&mut order, now, CancelSource::Stream),
            OrderStatus::Active if order.is_queued() => {
                order.resubmit()?;
                Ok(())
            }
            OrderStatus::Active | OrderStatus::Queued => Ok(()),
            OrderStatus::Rejected => {
                order.reject()?;
                warn!(order_id = %order.id, symbol = %order.symbol, "order rejected by venue");
                Ok(())
            }
            OrderStatus::Liquidated => {
                order.liquidate()?;
                warn!(order_id = %order.id, symbol = %order.symbol, "position liquidated");
                Ok(())
            }
        };

        self.persist_order(&mut order);
        self.orders.insert(order.id, order);
        result
    }

    // ---- order entry ------------------------------------------------------

    /// Validate, fund-check and register a new order.
    ///
    /// In live modes an order the balance cannot yet cover is queued instead
    /// of refused, to be resubmitted once funds free up.
    pub fn submit_order(
        &mut self,
        exchange: ExchangeId,
        symbol: &str,
        side: Side,
        order_type: OrderType,
        qty: f64,
        price: Option<f64>,
        reduce_only: bool,
    ) -> Result<Uuid, EngineError> {
        let now = self.now_ms();
        let mut builder = OrderBuilder::new(exchange, symbol, side, order_type)
            .qty(qty)
            .reduce_only(reduce_only)
            .session_id(self.session_id);
        if let Some(price) = price {
            builder = builder.price(price);
        }
        let mut order = builder.build(now)?;

        let simulator = self
            .exchanges
            .get(&exchange)
            .ok_or(EngineError::UnknownExchange(exchange))?;

        match simulator.on_order_submission(&order) {
            Ok(()) => {
                if self.config.is_debuggable(LogEvent::OrderSubmission) {
                    debug!(order_id = %order.id, symbol = %order.symbol, side = %order.side, "order submitted");
                }
                self.notify_order(
                    &order,
                    "SUBMITTED",
                    self.config.env_notifications_events_submitted_orders,
                );
            }
            Err(ExecutionError::InsufficientBalance { .. }) if self.mode.is_live() => {
                // Funds not ready yet: park the order locally.
                order.queue_it()?;
                self.notify_order(
                    &order,
                    "QUEUED",
                    self.config.env_notifications_events_submitted_orders,
                );
            }
            Err(e) => return Err(e.into()),
        }

        self.persist_order(&mut order);
        let id = order.id;
        self.orders.insert(id, order);
        Ok(id)
    }

    /// Cancel an in-flight order on the strategy's behalf.
    pub fn cancel_order(&mut self, id: Uuid, source: CancelSource) -> Result<(), EngineError> {
        let now = self.now_ms();
        let mut order = self
            .orders
            .remove(&id)
            .ok_or(EngineError::UnknownOrder(id))?;
        let result = self.apply_cancel(&mut order, now, source);
        self.persist_order(&mut order);
        self.orders.insert(order.id, order);
        result
    }

    /// Fill an order directly; the backtest loop's execution entry point.
    ///
    /// `fill_qty = None` fills whatever remains.
    pub fn fill_order(
        &mut self,
        id: Uuid,
        fill_qty: Option<f64>,
        fill_price: f64,
    ) -> Result<(), EngineError> {
        let now = self.now_ms();
        let mut order = self
            .orders
            .remove(&id)
            .ok_or(EngineError::UnknownOrder(id))?;
        let fill_qty = fill_qty.unwrap_or(order.qty.abs() - order.filled_qty);
        let result = self.apply_fill(&mut order, fill_qty, Some(fill_price), now);
        self.persist_order(&mut order);
        self.orders.insert(order.id, order);
        result
    }

    fn apply_fill(
        &mut self,
        order: &mut Order,
        fill_qty: f64,
        fill_price: Option<f64>,
        now: i64,
    ) -> Result<(), EngineError> {
        let price = match fill_price.or(order.price) {
            Some(price) if price.is_finite() && price > 0.0 => price,
            _ => {
                return Err(ExecutionError::InvalidParameter(
                    "fill without a usable price".to_string(),
                )
                .into());
            }
        };

        order.execute_partially(now, fill_qty)?;
        if order.price.is_none() {
            // Market order: adopt the first known fill price.
            order.price = Some(price);
        }

        let simulator = self
            .exchanges
            .get(&order.exchange)
            .ok_or(EngineError::UnknownExchange(order.exchange))?;
        simulator.on_order_execution(order, fill_qty, price)?;

        if self.config.is_debuggable(LogEvent::OrderExecution) {
            debug!(
                order_id = %order.id,
                symbol = %order.symbol,
                fill_qty,
                price,
                status = %order.status,
                "order filled"
            );
        }
        if order.is_executed() {
            self.notify_order(
                order,
                "EXECUTED",
                self.config.env_notifications_events_executed_orders,
            );
            self.track_execution(order, now);
        }
        Ok(())
    }

    fn apply_cancel(
        &mut self,
        order: &mut Order,
        now: i64,
        source: CancelSource,
    ) -> Result<(), EngineError> {
        let was_queued = order.is_queued();
        order.cancel(now, source)?;
        if was_queued && order.is_queued() {
            // Late stream cancel against a never-transmitted order.
            return Ok(());
        }

        let simulator = self
            .exchanges
            .get(&order.exchange)
            .ok_or(EngineError::UnknownExchange(order.exchange))?;
        simulator.on_order_cancellation(order)?;

        if self.config.is_debuggable(LogEvent::OrderCancellation) {
            debug!(order_id = %order.id, symbol = %order.symbol, "order canceled");
        }
        self.notify_order(
            order,
            "CANCELED",
            self.config.env_notifications_events_cancelled_orders,
        );
        Ok(())
    }

    /// Fold a full execution into the open round trip for its market,
    /// synthesizing a [`ClosedTrade`] once the position returns to flat.
    fn track_execution(&mut self, order: &Order, now: i64) {
        let key = generate_composite_key(order.exchange, &order.symbol, None);
        let trade = self.open_trades.entry(key.clone()).or_insert_with(|| {
            let route = self
                .router
                .routes()
                .iter()
                .find(|route| route.exchange == order.exchange && route.symbol == order.symbol);
            ClosedTrade::new(
                route
                    .and_then(|route| route.strategy_name.as_deref())
                    .unwrap_or(""),
                order.exchange,
                &order.symbol,
                side_to_type(order.side),
                route
                    .and_then(|route| route.timeframe)
                    .unwrap_or(Timeframe::Minute1),
                now,
                1.0,
            )
        });
        trade.add_order(order);

        if !trade.is_open() {
            let mut closed = self
                .open_trades
                .remove(&key)
                .expect("entry inserted above");
            closed.closed_at = now;
            info!(
                symbol = %closed.symbol,
                exchange = %closed.exchange,
                pnl = closed.pnl(self.config.fee_for(closed.exchange)),
                "position closed"
            );
            if let Some(database) = self.database_for_writes()
                && let Ok(conn) = database.connection()
                && let Err(e) = entity::save(&mut closed, &conn, true)
            {
                warn!(error = %e, "failed to persist closed trade");
            }
        }
    }

    /// Open round trip for a market, if any.
    pub fn open_trade(&self, exchange: ExchangeId, symbol: &str) -> Option<&ClosedTrade> {
        self.open_trades
            .get(&generate_composite_key(exchange, symbol, None))
    }

    // ---- persistence ------------------------------------------------------

    fn database_for_writes(&self) -> Option<&Database> {
        // Optimize runs hammer the same paths thousands of times; nothing
        // they produce is worth a row.
        if self.mode.is_optimizing() {
            return None;
        }
        self.database.as_ref()
    }

    fn persist_order(&self, order: &mut Order) {
        let Some(database) = self.database_for_writes() else {
            return;
        };
        match database.connection() {
            Ok(conn) => {
                if let Err(e) = entity::save(order, &conn, true) {
                    warn!(order_id = %order.id, error = %e, "failed to persist order");
                }
            }
            Err(e) => warn!(order_id = %order.id, error = %e, "no connection to persist order"),
        }
    }

    /// Append one balance row per venue for today; the natural key keeps
    /// this idempotent within a UTC day.
    pub fn record_daily_balances(&self) -> Result<(), EngineError> {
        let Some(database) = self.database_for_writes() else {
            return Ok(());
        };
        let conn = database.connection()?;
        let today = cipher_instrument::time::today_to_timestamp();

        for (id, exchange) in &self.exchanges {
            let asset = exchange_info(*id).settlement_currency.unwrap_or("USDT");
            let mut row = entity::trading::DailyBalance::new(
                *id,
                asset,
                today,
                exchange.wallet_balance(),
                None,
            );
            entity::save(&mut row, &conn, false)?;
        }
        Ok(())
    }

    /// Drain persistence and stop accepting connections.
    pub fn shutdown(&self) {
        if let Some(database) = &self.database {
            database.shutdown();
        }
    }

    fn notify_order(&self, order: &Order, verb: &str, enabled: bool) {
        if !enabled || !self.mode.is_live() || self.config.should_execute_silently() {
            return;
        }
        let price = order
            .price
            .map(|price| format!(" @ {price}"))
            .unwrap_or_default();
        self.notifier.notify(&format!(
            "{verb} {} {} order: {} {}{}",
            order.side,
            order.order_type,
            order.symbol,
            order.qty.abs(),
            price
        ));
    }
}

fn build_exchange(id: ExchangeId, config: &Config, mode: TradingMode) -> Box<dyn Exchange> {
    let info = exchange_info(id);
    let fee = config.fee_for(id);
    match info.kind {
        ExchangeKind::Spot => {
            let exchange = SpotExchange::new(id, DEFAULT_STARTING_BALANCE, fee);
            Box::new(if mode.is_live() {
                exchange.live()
            } else {
                exchange
            })
        }
        ExchangeKind::Futures => {
            let exchange = FuturesExchange::new(
                id,
                DEFAULT_STARTING_BALANCE,
                fee,
                info.settlement_currency.unwrap_or("USDT"),
                1.0,
            );
            Box::new(if mode.is_live() {
                exchange.live()
            } else {
                exchange
            })
        }
    }
}

/// Abort the process after an unrecoverable error.
pub fn terminate_app() -> ! {
    error!("terminating after unrecoverable error");
    std::process::exit(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cipher_data::route::Route;

    fn engine() -> Engine {
        let mut router = Router::default();
        router
            .init(
                vec![
                    Route::new(ExchangeId::BinanceSpot, "BTC-USDT", Some(Timeframe::Hour1))
                        .with_strategy("test_strategy"),
                ],
                vec![],
            )
            .unwrap();
        Engine::new(Config::default(), router)
    }

    #[test]
    fn spot_buy_lifecycle_matches_balance_algebra() {
        let mut engine = engine();
        let id = engine
            .submit_order(
                ExchangeId::BinanceSpot,
                "BTC-USDT",
                Side::Buy,
                OrderType::Limit,
                1.0,
                Some(5_000.0),
                false,
            )
            .unwrap();

        let exchange = engine.exchange(ExchangeId::BinanceSpot).unwrap();
        assert_eq!(exchange.asset("USDT"), 5_000.0);
        assert_eq!(exchange.asset("BTC"), 0.0);

        engine.fill_order(id, None, 5_000.0).unwrap();
        let exchange = engine.exchange(ExchangeId::BinanceSpot).unwrap();
        assert_eq!(exchange.asset("USDT"), 5_000.0);
        assert_eq!(exchange.asset("BTC"), 0.999);
        assert!(engine.order(id).unwrap().is_executed());
    }

    #[test]
    fn over_committed_sells_are_refused_in_backtest() {
        let mut engine = engine();
        engine
            .exchange(ExchangeId::BinanceSpot)
            .unwrap()
            .set_asset("BTC", 2.0);

        for qty in [1.0, 1.0] {
            engine
                .submit_order(
                    ExchangeId::BinanceSpot,
                    "BTC-USDT",
                    Side::Sell,
                    OrderType::Limit,
                    qty,
                    Some(5_000.0),
                    false,
                )
                .unwrap();
        }
        let err = engine
            .submit_order(
                ExchangeId::BinanceSpot,
                "BTC-USDT",
                Side::Sell,
                OrderType::Limit,
                0.1,
                Some(5_000.0),
                false,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Execution(ExecutionError::InsufficientBalance { .. })
        ));
        assert_eq!(
            engine
                .exchange(ExchangeId::BinanceSpot)
                .unwrap()
                .asset("BTC"),
            2.0
        );
    }

    #[test]
    fn live_mode_queues_unfunded_orders() {
        let mut router = Router::default();
        router
            .init(
                vec![Route::new(ExchangeId::BinanceSpot, "BTC-USDT", Some(Timeframe::Hour1))],
                vec![],
            )
            .unwrap();
        let config = Config {
            app_trading_mode: TradingMode::Papertrade,
            ..Config::default()
        };
        let mut engine = Engine::new(config, router);

        let id = engine
            .submit_order(
                ExchangeId::BinanceSpot,
                "BTC-USDT",
                Side::Buy,
                OrderType::Limit,
                100.0,
                Some(5_000.0),
                false,
            )
            .unwrap();
        assert!(engine.order(id).unwrap().is_queued());

        // A stream resubmission moves it to active under a fresh id.
        engine
            .on_order_update(OrderUpdate {
                id,
                status: OrderStatus::Active,
                filled_qty: 0.0,
                exchange_id: Some("X-1".to_string()),
                price: None,
            })
            .unwrap();
        assert!(engine.order(id).is_none());
        assert!(engine.orders().any(|order| order.is_active()));
    }

    #[test]
    fn ticker_updates_throttle_to_one_per_second() {
        let mut engine = engine();
        for (ts, price) in [(10_000, 100.0), (10_400, 101.0), (11_500, 102.0)] {
            engine
                .on_ticker_update(
                    ExchangeId::BinanceSpot,
                    "BTCUSDT",
                    TickerUpdate {
                        timestamp: ts,
                        last_price: price,
                        volume: 1.0,
                        high: price,
                        low: price,
                    },
                )
                .unwrap();
        }
        assert_eq!(
            engine
                .market_data()
                .tickers
                .len(ExchangeId::BinanceSpot, "BTC-USDT")
                .unwrap(),
            2
        );
    }

    #[test]
    fn backtest_clock_freezes_at_candle_close() {
        let mut engine = engine();
        assert_eq!(engine.now_ms(), 0);
        engine
            .on_candle_update(
                ExchangeId::BinanceSpot,
                "BTC-USDT",
                Timeframe::Hour1,
                [3_600_000.0, 100.0, 101.0, 102.0, 99.0, 5.0],
            )
            .unwrap();
        // Clock sits at the candle's close, not the wall clock.
        assert_eq!(engine.now_ms(), 7_200_000);
    }

    #[test]
    fn round_trip_synthesizes_a_closed_trade() {
        let mut router = Router::default();
        router
            .init(
                vec![
                    Route::new(ExchangeId::BinanceSpot, "BTC-USDT", Some(Timeframe::Hour1))
                        .with_strategy("test_strategy"),
                ],
                vec![],
            )
            .unwrap();
        // Zero fee so the full base amount can be sold back.
        let mut config = Config::default();
        config.env_exchange_fees.insert(ExchangeId::BinanceSpot, 0.0);
        let mut engine = Engine::new(config, router);

        let buy = engine
            .submit_order(
                ExchangeId::BinanceSpot,
                "BTC-USDT",
                Side::Buy,
                OrderType::Limit,
                1.0,
                Some(5_000.0),
                false,
            )
            .unwrap();
        engine.fill_order(buy, None, 5_000.0).unwrap();
        assert!(engine.open_trade(ExchangeId::BinanceSpot, "BTC-USDT").is_some());

        let sell = engine
            .submit_order(
                ExchangeId::BinanceSpot,
                "BTC-USDT",
                Side::Sell,
                OrderType::Limit,
                1.0,
                Some(6_000.0),
                false,
            )
            .unwrap();
        engine.fill_order(sell, None, 6_000.0).unwrap();
        // Sold the whole holding back: position flat, trade closed out.
        assert!(engine.open_trade(ExchangeId::BinanceSpot, "BTC-USDT").is_none());
    }

    #[test]
    fn stream_cancel_of_queued_order_is_a_noop() {
        let mut router = Router::default();
        router
            .init(
                vec![Route::new(ExchangeId::BinanceSpot, "BTC-USDT", None)],
                vec![],
            )
            .unwrap();
        let config = Config {
            app_trading_mode: TradingMode::Papertrade,
            ..Config::default()
        };
        let mut engine = Engine::new(config, router);
        let id = engine
            .submit_order(
                ExchangeId::BinanceSpot,
                "BTC-USDT",
                Side::Buy,
                OrderType::Limit,
                100.0,
                Some(5_000.0),
                false,
            )
            .unwrap();
        assert!(engine.order(id).unwrap().is_queued());

        engine
            .on_order_update(OrderUpdate {
                id,
                status: OrderStatus::Canceled,
                filled_qty: 0.0,
                exchange_id: None,
                price: None,
            })
            .unwrap();
        assert!(engine.order(id).unwrap().is_queued());

        // A strategy cancel, by contrast, goes through.
        engine.cancel_order(id, CancelSource::Strategy).unwrap();
        assert!(engine.order(id).unwrap().is_canceled());
    }

    #[test]
    fn unknown_order_updates_fail() {
        let mut engine = engine();
        let err = engine
            .on_order_update(OrderUpdate {
                id: Uuid::new_v4(),
                status: OrderStatus::Executed,
                filled_qty: 1.0,
                exchange_id: None,
                price: Some(1.0),
            })
            .unwrap_err();
        assert!(matches!(err, EngineError::UnknownOrder(_)));
    }
}
