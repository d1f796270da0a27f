use crate::entity::{
    Entity, Filter,
    market::{parse_exchange, parse_timeframe, parse_uuid},
};
use cipher_execution::{order::Order, pnl::estimate_pnl};
use cipher_instrument::{
    TradeType, exchange::ExchangeId, timeframe::Timeframe, type_to_side,
};
use rusqlite::{Row, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

impl Entity for Order {
    const TABLE: &'static str = "orders";
    const COLUMNS: &'static [&'static str] = &[
        "trade_id",
        "session_id",
        "exchange_id",
        "symbol",
        "exchange",
        "order_side",
        "order_type",
        "reduce_only",
        "qty",
        "filled_qty",
        "price",
        "status",
        "created_at",
        "executed_at",
        "canceled_at",
        "vars",
        "submitted_via",
    ];

    fn id(&self) -> Uuid {
        self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let text_err = |idx, e: Box<dyn std::error::Error + Send + Sync>| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, e)
        };

        let side: String = row.get(6)?;
        let order_type: String = row.get(7)?;
        let status: String = row.get(12)?;
        let vars: String = row.get(16)?;
        let submitted_via: Option<String> = row.get(17)?;

        Ok(Self {
            id: parse_uuid(row, 0)?,
            trade_id: parse_optional_uuid(row, 1)?,
            session_id: parse_optional_uuid(row, 2)?,
            exchange_id: row.get(3)?,
            symbol: row.get(4)?,
            exchange: parse_exchange(row, 5)?,
            side: side.parse().map_err(|e| text_err(6, Box::new(e)))?,
            order_type: order_type.parse().map_err(|e| text_err(7, Box::new(e)))?,
            reduce_only: row.get(8)?,
            qty: row.get(9)?,
            filled_qty: row.get(10)?,
            price: row.get(11)?,
            status: status.parse().map_err(|e| text_err(12, Box::new(e)))?,
            created_at: row.get(13)?,
            executed_at: row.get(14)?,
            canceled_at: row.get(15)?,
            vars: serde_json::from_str(&vars).map_err(|e| text_err(16, Box::new(e)))?,
            submitted_via: match submitted_via {
                Some(via) if via == "stop_loss" => {
                    Some(cipher_instrument::order::OrderSubmittedVia::StopLoss)
                }
                Some(via) if via == "take_profit" => {
                    Some(cipher_instrument::order::OrderSubmittedVia::TakeProfit)
                }
                _ => None,
            },
        })
    }

    fn values(&self) -> Vec<Box<dyn ToSql>> {
        vec![
            Box::new(self.trade_id.map(|id| id.to_string())),
            Box::new(self.session_id.map(|id| id.to_string())),
            Box::new(self.exchange_id.clone()),
            Box::new(self.symbol.clone()),
            Box::new(self.exchange.as_str()),
            Box::new(self.side.as_str()),
            Box::new(self.order_type.as_str()),
            Box::new(self.reduce_only),
            Box::new(self.qty),
            Box::new(self.filled_qty),
            Box::new(self.price),
            Box::new(self.status.as_str()),
            Box::new(self.created_at),
            Box::new(self.executed_at),
            Box::new(self.canceled_at),
            Box::new(self.vars.to_string()),
            Box::new(self.submitted_via.map(|via| via.as_str())),
        ]
    }

    fn natural_key(&self) -> Vec<(&'static str, Box<dyn ToSql>)> {
        vec![("id", Box::new(self.id.to_string()))]
    }
}

fn parse_optional_uuid(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Uuid>> {
    let raw: Option<String> = row.get(idx)?;
    match raw {
        None => Ok(None),
        Some(raw) => Uuid::parse_str(&raw).map(Some).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                idx,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        }),
    }
}

/// Conjunctive order query.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub session_id: Option<Uuid>,
    pub exchange: Option<ExchangeId>,
    pub symbol: Option<String>,
    pub status: Option<String>,
    pub timestamp_start: Option<i64>,
    pub timestamp_end: Option<i64>,
}

impl Filter for OrderFilter {
    fn clauses(&self) -> Vec<(String, Box<dyn ToSql>)> {
        let mut clauses: Vec<(String, Box<dyn ToSql>)> = Vec::new();
        if let Some(session_id) = self.session_id {
            clauses.push(("session_id = ?".to_string(), Box::new(session_id.to_string())));
        }
        if let Some(exchange) = self.exchange {
            clauses.push(("exchange = ?".to_string(), Box::new(exchange.as_str())));
        }
        if let Some(symbol) = &self.symbol {
            clauses.push(("symbol = ?".to_string(), Box::new(symbol.clone())));
        }
        if let Some(status) = &self.status {
            clauses.push(("status = ?".to_string(), Box::new(status.clone())));
        }
        if let Some(start) = self.timestamp_start {
            clauses.push(("created_at >= ?".to_string(), Box::new(start)));
        }
        if let Some(end) = self.timestamp_end {
            clauses.push(("created_at <= ?".to_string(), Box::new(end)));
        }
        clauses
    }
}

/// One (qty, price) execution folded into a closed trade.
#[derive(Debug, Copy, Clone, PartialEq, Deserialize, Serialize)]
pub struct OrderFill {
    pub qty: f64,
    pub price: f64,
}

/// A completed round trip: orders in, position flat again.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ClosedTrade {
    pub id: Uuid,
    pub strategy_name: String,
    pub symbol: String,
    pub exchange: ExchangeId,
    pub position_type: TradeType,
    pub timeframe: Timeframe,
    pub opened_at: i64,
    pub closed_at: i64,
    pub leverage: f64,
    pub buy_orders: Vec<OrderFill>,
    pub sell_orders: Vec<OrderFill>,
}

impl ClosedTrade {
    pub fn new(
        strategy_name: &str,
        exchange: ExchangeId,
        symbol: &str,
        position_type: TradeType,
        timeframe: Timeframe,
        opened_at: i64,
        leverage: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            strategy_name: strategy_name.to_string(),
            symbol: symbol.to_string(),
            exchange,
            position_type,
            timeframe,
            opened_at,
            closed_at: 0,
            leverage,
            buy_orders: Vec::new(),
            sell_orders: Vec::new(),
        }
    }

    pub fn add_buy_order(&mut self, qty: f64, price: f64) {
        self.buy_orders.push(OrderFill {
            qty: qty.abs(),
            price,
        });
    }

    pub fn add_sell_order(&mut self, qty: f64, price: f64) {
        self.sell_orders.push(OrderFill {
            qty: qty.abs(),
            price,
        });
    }

    /// Fold an executed order's fill into the trade.
    pub fn add_order(&mut self, order: &Order) {
        let price = order.price.unwrap_or(0.0);
        match order.side {
            cipher_instrument::Side::Buy => self.add_buy_order(order.filled_qty, price),
            cipher_instrument::Side::Sell => self.add_sell_order(order.filled_qty, price),
        }
    }

    fn opening_orders(&self) -> &[OrderFill] {
        match type_to_side(self.position_type) {
            cipher_instrument::Side::Buy => &self.buy_orders,
            cipher_instrument::Side::Sell => &self.sell_orders,
        }
    }

    fn closing_orders(&self) -> &[OrderFill] {
        match type_to_side(self.position_type) {
            cipher_instrument::Side::Buy => &self.sell_orders,
            cipher_instrument::Side::Sell => &self.buy_orders,
        }
    }

    /// Position size: total quantity of the opening side.
    pub fn qty(&self) -> f64 {
        self.opening_orders().iter().map(|fill| fill.qty).sum()
    }

    /// Volume-weighted entry price.
    pub fn entry_price(&self) -> f64 {
        vwap(self.opening_orders())
    }

    /// Volume-weighted exit price.
    pub fn exit_price(&self) -> f64 {
        vwap(self.closing_orders())
    }

    pub fn size(&self) -> f64 {
        self.qty() * self.entry_price()
    }

    pub fn pnl(&self, fee_rate: f64) -> f64 {
        estimate_pnl(
            self.qty(),
            self.entry_price(),
            self.exit_price(),
            self.position_type,
            fee_rate,
        )
        .unwrap_or(0.0)
    }

    pub fn pnl_percentage(&self, fee_rate: f64) -> f64 {
        let size = self.size();
        if size == 0.0 {
            return 0.0;
        }
        self.pnl(fee_rate) / size * 100.0 * self.leverage
    }

    /// Seconds the position was held.
    pub fn holding_period(&self) -> i64 {
        (self.closed_at - self.opened_at) / 1_000
    }

    pub fn is_long(&self) -> bool {
        self.position_type == TradeType::Long
    }

    pub fn is_short(&self) -> bool {
        self.position_type == TradeType::Short
    }

    /// Still open while the closing side has not matched the opening side.
    pub fn is_open(&self) -> bool {
        let closed: f64 = self.closing_orders().iter().map(|fill| fill.qty).sum();
        closed < self.qty()
    }
}

fn vwap(fills: &[OrderFill]) -> f64 {
    let qty: f64 = fills.iter().map(|fill| fill.qty).sum();
    if qty == 0.0 {
        return 0.0;
    }
    fills.iter().map(|fill| fill.qty * fill.price).sum::<f64>() / qty
}

impl Entity for ClosedTrade {
    const TABLE: &'static str = "closed_trades";
    const COLUMNS: &'static [&'static str] = &[
        "strategy_name",
        "symbol",
        "exchange",
        "position_type",
        "timeframe",
        "opened_at",
        "closed_at",
        "leverage",
        "buy_orders",
        "sell_orders",
    ];

    fn id(&self) -> Uuid {
        self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let text_err = |idx, e: Box<dyn std::error::Error + Send + Sync>| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, e)
        };
        let position_type: String = row.get(4)?;
        let buy_orders: String = row.get(9)?;
        let sell_orders: String = row.get(10)?;

        Ok(Self {
            id: parse_uuid(row, 0)?,
            strategy_name: row.get(1)?,
            symbol: row.get(2)?,
            exchange: parse_exchange(row, 3)?,
            position_type: position_type.parse().map_err(|e| text_err(4, Box::new(e)))?,
            timeframe: parse_timeframe(row, 5)?,
            opened_at: row.get(6)?,
            closed_at: row.get(7)?,
            leverage: row.get(8)?,
            buy_orders: serde_json::from_str(&buy_orders)
                .map_err(|e| text_err(9, Box::new(e)))?,
            sell_orders: serde_json::from_str(&sell_orders)
                .map_err(|e| text_err(10, Box::new(e)))?,
        })
    }

    fn values(&self) -> Vec<Box<dyn ToSql>> {
        vec![
            Box::new(self.strategy_name.clone()),
            Box::new(self.symbol.clone()),
            Box::new(self.exchange.as_str()),
            Box::new(self.position_type.as_str()),
            Box::new(self.timeframe.as_str()),
            Box::new(self.opened_at),
            Box::new(self.closed_at),
            Box::new(self.leverage),
            Box::new(serde_json::to_string(&self.buy_orders).unwrap_or_default()),
            Box::new(serde_json::to_string(&self.sell_orders).unwrap_or_default()),
        ]
    }

    fn natural_key(&self) -> Vec<(&'static str, Box<dyn ToSql>)> {
        vec![("id", Box::new(self.id.to_string()))]
    }
}

/// Conjunctive closed-trade query.
#[derive(Debug, Clone, Default)]
pub struct ClosedTradeFilter {
    pub strategy_name: Option<String>,
    pub exchange: Option<ExchangeId>,
    pub symbol: Option<String>,
    pub timestamp_start: Option<i64>,
    pub timestamp_end: Option<i64>,
}

impl Filter for ClosedTradeFilter {
    fn clauses(&self) -> Vec<(String, Box<dyn ToSql>)> {
        let mut clauses: Vec<(String, Box<dyn ToSql>)> = Vec::new();
        if let Some(strategy_name) = &self.strategy_name {
            clauses.push((
                "strategy_name = ?".to_string(),
                Box::new(strategy_name.clone()),
            ));
        }
        if let Some(exchange) = self.exchange {
            clauses.push(("exchange = ?".to_string(), Box::new(exchange.as_str())));
        }
        if let Some(symbol) = &self.symbol {
            clauses.push(("symbol = ?".to_string(), Box::new(symbol.clone())));
        }
        if let Some(start) = self.timestamp_start {
            clauses.push(("closed_at >= ?".to_string(), Box::new(start)));
        }
        if let Some(end) = self.timestamp_end {
            clauses.push(("closed_at <= ?".to_string(), Box::new(end)));
        }
        clauses
    }
}

/// End-of-day balance snapshot per asset.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DailyBalance {
    pub id: Uuid,
    pub timestamp: i64,
    pub identifier: Option<String>,
    pub exchange: ExchangeId,
    pub asset: String,
    pub balance: f64,
}

impl DailyBalance {
    pub fn new(
        exchange: ExchangeId,
        asset: &str,
        timestamp: i64,
        balance: f64,
        identifier: Option<&str>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            identifier: identifier.map(str::to_string),
            exchange,
            asset: asset.to_string(),
            balance,
        }
    }
}

impl Entity for DailyBalance {
    const TABLE: &'static str = "daily_balances";
    const COLUMNS: &'static [&'static str] =
        &["timestamp", "identifier", "exchange", "asset", "balance"];

    fn id(&self) -> Uuid {
        self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: parse_uuid(row, 0)?,
            timestamp: row.get(1)?,
            identifier: row.get(2)?,
            exchange: parse_exchange(row, 3)?,
            asset: row.get(4)?,
            balance: row.get(5)?,
        })
    }

    fn values(&self) -> Vec<Box<dyn ToSql>> {
        vec![
            Box::new(self.timestamp),
            Box::new(self.identifier.clone()),
            Box::new(self.exchange.as_str()),
            Box::new(self.asset.clone()),
            Box::new(self.balance),
        ]
    }

    fn natural_key(&self) -> Vec<(&'static str, Box<dyn ToSql>)> {
        vec![
            ("identifier", Box::new(self.identifier.clone())),
            ("exchange", Box::new(self.exchange.as_str())),
            ("asset", Box::new(self.asset.clone())),
            ("timestamp", Box::new(self.timestamp)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{entity, schema};
    use cipher_execution::order::builder::OrderBuilder;
    use cipher_instrument::{Side, order::OrderType};
    use rusqlite::Connection;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        schema::init_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn order_round_trips_through_sql() {
        let conn = conn();
        let mut order = OrderBuilder::new(
            ExchangeId::BinanceSpot,
            "BTC-USDT",
            Side::Sell,
            OrderType::Limit,
        )
        .qty(2.0)
        .price(30_000.0)
        .vars(serde_json::json!({"note": "tp ladder"}))
        .build(1_700_000_000_000)
        .unwrap();

        entity::save(&mut order, &conn, false).unwrap();
        let loaded: Order = entity::find_by_id(&conn, order.id).unwrap().unwrap();
        assert_eq!(loaded, order);
    }

    #[test]
    fn order_state_changes_update_the_same_row() {
        let conn = conn();
        let mut order = OrderBuilder::new(
            ExchangeId::BinanceSpot,
            "BTC-USDT",
            Side::Buy,
            OrderType::Limit,
        )
        .qty(1.0)
        .price(30_000.0)
        .build(0)
        .unwrap();
        entity::save(&mut order, &conn, true).unwrap();

        order.execute(1_000).unwrap();
        entity::save(&mut order, &conn, true).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM orders", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
        let loaded: Order = entity::find_by_id(&conn, order.id).unwrap().unwrap();
        assert!(loaded.is_executed());
        assert_eq!(loaded.executed_at, Some(1_000));
    }

    #[test]
    fn order_filter_by_status() {
        let conn = conn();
        for (qty, execute) in [(1.0, true), (2.0, false)] {
            let mut order = OrderBuilder::new(
                ExchangeId::BinanceSpot,
                "BTC-USDT",
                Side::Buy,
                OrderType::Limit,
            )
            .qty(qty)
            .price(100.0)
            .build(0)
            .unwrap();
            if execute {
                order.execute(1).unwrap();
            }
            entity::save(&mut order, &conn, false).unwrap();
        }

        let filter = OrderFilter {
            status: Some("executed".to_string()),
            ..OrderFilter::default()
        };
        let found: Vec<Order> = entity::find_by_filter(&conn, &filter).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].qty, 1.0);
    }

    #[test]
    fn closed_trade_derivations() {
        let mut trade = ClosedTrade::new(
            "trend_follower",
            ExchangeId::BinanceSpot,
            "BTC-USDT",
            TradeType::Long,
            Timeframe::Hour1,
            1_000_000,
            1.0,
        );
        trade.add_buy_order(1.0, 100.0);
        trade.add_buy_order(1.0, 200.0);
        assert!(trade.is_open());

        trade.add_sell_order(2.0, 250.0);
        trade.closed_at = 4_600_000;

        assert!(!trade.is_open());
        assert!(trade.is_long());
        assert_eq!(trade.qty(), 2.0);
        assert_eq!(trade.entry_price(), 150.0);
        assert_eq!(trade.exit_price(), 250.0);
        assert_eq!(trade.size(), 300.0);
        // 2 * (250 - 150) with no fees.
        assert_eq!(trade.pnl(0.0), 200.0);
        assert!((trade.pnl_percentage(0.0) - 200.0 / 300.0 * 100.0).abs() < 1e-9);
        assert_eq!(trade.holding_period(), 3_600);
    }

    #[test]
    fn short_trade_opens_with_sells() {
        let mut trade = ClosedTrade::new(
            "fader",
            ExchangeId::BinancePerpetualFutures,
            "ETH-USDT",
            TradeType::Short,
            Timeframe::Minute15,
            0,
            2.0,
        );
        trade.add_sell_order(3.0, 2_000.0);
        trade.add_buy_order(3.0, 1_900.0);

        assert_eq!(trade.qty(), 3.0);
        assert_eq!(trade.entry_price(), 2_000.0);
        assert_eq!(trade.exit_price(), 1_900.0);
        // Short profits on the way down: 3 * 100.
        assert_eq!(trade.pnl(0.0), 300.0);
    }

    #[test]
    fn closed_trade_round_trips_through_sql() {
        let conn = conn();
        let mut trade = ClosedTrade::new(
            "trend_follower",
            ExchangeId::BinanceSpot,
            "BTC-USDT",
            TradeType::Long,
            Timeframe::Hour4,
            1_000,
            1.0,
        );
        trade.add_buy_order(1.5, 30_000.0);
        trade.add_sell_order(1.5, 31_000.0);
        trade.closed_at = 2_000;

        entity::save(&mut trade, &conn, false).unwrap();
        let loaded: ClosedTrade = entity::find_by_id(&conn, trade.id).unwrap().unwrap();
        assert_eq!(loaded, trade);
        assert_eq!(loaded.pnl(0.0), 1_500.0);
    }

    #[test]
    fn daily_balance_unique_per_day_even_without_identifier() {
        let conn = conn();
        let mut balance =
            DailyBalance::new(ExchangeId::BinanceSpot, "USDT", 86_400_000, 10_000.0, None);
        entity::save(&mut balance, &conn, true).unwrap();

        // Same NULL identifier + day: updates instead of duplicating.
        let mut same_day =
            DailyBalance::new(ExchangeId::BinanceSpot, "USDT", 86_400_000, 11_000.0, None);
        entity::save(&mut same_day, &conn, true).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM daily_balances", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(same_day.id, balance.id);
    }
}
