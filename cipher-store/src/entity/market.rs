use crate::entity::{Entity, Filter};
use cipher_instrument::{exchange::ExchangeId, timeframe::Timeframe};
use rusqlite::{Row, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One persisted OHLCV bar.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CandleRecord {
    pub id: Uuid,
    pub timestamp: i64,
    pub open: f64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
    pub volume: f64,
    pub exchange: ExchangeId,
    pub symbol: String,
    pub timeframe: Timeframe,
}

impl CandleRecord {
    pub fn new(
        exchange: ExchangeId,
        symbol: &str,
        timeframe: Timeframe,
        timestamp: i64,
        open: f64,
        close: f64,
        high: f64,
        low: f64,
        volume: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            open,
            close,
            high,
            low,
            volume,
            exchange,
            symbol: symbol.to_string(),
            timeframe,
        }
    }

    /// OHLC ordering and non-negative volume.
    pub fn is_well_formed(&self) -> bool {
        self.low <= self.open.min(self.close)
            && self.high >= self.open.max(self.close)
            && self.volume >= 0.0
    }
}

impl Entity for CandleRecord {
    const TABLE: &'static str = "candles";
    const COLUMNS: &'static [&'static str] = &[
        "timestamp",
        "open",
        "close",
        "high",
        "low",
        "volume",
        "exchange",
        "symbol",
        "timeframe",
    ];

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
            open: row.get(2)?,
            close: row.get(3)?,
            high: row.get(4)?,
            low: row.get(5)?,
            volume: row.get(6)?,
            exchange: parse_exchange(row, 7)?,
            symbol: row.get(8)?,
            timeframe: parse_timeframe(row, 9)?,
        })
    }

    fn values(&self) -> Vec<Box<dyn ToSql>> {
        vec![
            Box::new(self.timestamp),
            Box::new(self.open),
            Box::new(self.close),
            Box::new(self.high),
            Box::new(self.low),
            Box::new(self.volume),
            Box::new(self.exchange.as_str()),
            Box::new(self.symbol.clone()),
            Box::new(self.timeframe.as_str()),
        ]
    }

    fn natural_key(&self) -> Vec<(&'static str, Box<dyn ToSql>)> {
        vec![
            ("exchange", Box::new(self.exchange.as_str())),
            ("symbol", Box::new(self.symbol.clone())),
            ("timeframe", Box::new(self.timeframe.as_str())),
            ("timestamp", Box::new(self.timestamp)),
        ]
    }
}

/// Conjunctive candle query.
#[derive(Debug, Clone, Default)]
pub struct CandleFilter {
    pub exchange: Option<ExchangeId>,
    pub symbol: Option<String>,
    pub timeframe: Option<Timeframe>,
    pub timestamp: Option<i64>,
    pub timestamp_start: Option<i64>,
    pub timestamp_end: Option<i64>,
}

impl Filter for CandleFilter {
    fn clauses(&self) -> Vec<(String, Box<dyn ToSql>)> {
        let mut clauses: Vec<(String, Box<dyn ToSql>)> = Vec::new();
        if let Some(exchange) = self.exchange {
            clauses.push(("exchange = ?".to_string(), Box::new(exchange.as_str())));
        }
        if let Some(symbol) = &self.symbol {
            clauses.push(("symbol = ?".to_string(), Box::new(symbol.clone())));
        }
        if let Some(timeframe) = self.timeframe {
            clauses.push(("timeframe = ?".to_string(), Box::new(timeframe.as_str())));
        }
        if let Some(ts) = self.timestamp {
            clauses.push(("timestamp = ?".to_string(), Box::new(ts)));
        }
        if let Some(start) = self.timestamp_start {
            clauses.push(("timestamp >= ?".to_string(), Box::new(start)));
        }
        if let Some(end) = self.timestamp_end {
            clauses.push(("timestamp <= ?".to_string(), Box::new(end)));
        }
        clauses
    }
}

/// One persisted ticker sample.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TickerRecord {
    pub id: Uuid,
    pub timestamp: i64,
    pub last_price: f64,
    pub volume: f64,
    pub high_price: f64,
    pub low_price: f64,
    pub symbol: String,
    pub exchange: ExchangeId,
}

impl TickerRecord {
    pub fn new(
        exchange: ExchangeId,
        symbol: &str,
        timestamp: i64,
        last_price: f64,
        volume: f64,
        high_price: f64,
        low_price: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            last_price,
            volume,
            high_price,
            low_price,
            symbol: symbol.to_string(),
            exchange,
        }
    }
}

impl Entity for TickerRecord {
    const TABLE: &'static str = "tickers";
    const COLUMNS: &'static [&'static str] = &[
        "timestamp",
        "last_price",
        "volume",
        "high_price",
        "low_price",
        "symbol",
        "exchange",
    ];

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
            last_price: row.get(2)?,
            volume: row.get(3)?,
            high_price: row.get(4)?,
            low_price: row.get(5)?,
            symbol: row.get(6)?,
            exchange: parse_exchange(row, 7)?,
        })
    }

    fn values(&self) -> Vec<Box<dyn ToSql>> {
        vec![
            Box::new(self.timestamp),
            Box::new(self.last_price),
            Box::new(self.volume),
            Box::new(self.high_price),
            Box::new(self.low_price),
            Box::new(self.symbol.clone()),
            Box::new(self.exchange.as_str()),
        ]
    }

    fn natural_key(&self) -> Vec<(&'static str, Box<dyn ToSql>)> {
        vec![
            ("exchange", Box::new(self.exchange.as_str())),
            ("symbol", Box::new(self.symbol.clone())),
            ("timestamp", Box::new(self.timestamp)),
        ]
    }
}

/// Conjunctive ticker query.
#[derive(Debug, Clone, Default)]
pub struct TickerFilter {
    pub exchange: Option<ExchangeId>,
    pub symbol: Option<String>,
    pub timestamp_start: Option<i64>,
    pub timestamp_end: Option<i64>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
}

impl Filter for TickerFilter {
    fn clauses(&self) -> Vec<(String, Box<dyn ToSql>)> {
        let mut clauses: Vec<(String, Box<dyn ToSql>)> = Vec::new();
        if let Some(exchange) = self.exchange {
            clauses.push(("exchange = ?".to_string(), Box::new(exchange.as_str())));
        }
        if let Some(symbol) = &self.symbol {
            clauses.push(("symbol = ?".to_string(), Box::new(symbol.clone())));
        }
        if let Some(start) = self.timestamp_start {
            clauses.push(("timestamp >= ?".to_string(), Box::new(start)));
        }
        if let Some(end) = self.timestamp_end {
            clauses.push(("timestamp <= ?".to_string(), Box::new(end)));
        }
        if let Some(min) = self.price_min {
            clauses.push(("last_price >= ?".to_string(), Box::new(min)));
        }
        if let Some(max) = self.price_max {
            clauses.push(("last_price <= ?".to_string(), Box::new(max)));
        }
        clauses
    }
}

/// One persisted minute of aggregated public trades.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TradeRecord {
    pub id: Uuid,
    pub timestamp: i64,
    pub price: f64,
    pub buy_qty: f64,
    pub sell_qty: f64,
    pub buy_count: i64,
    pub sell_count: i64,
    pub symbol: String,
    pub exchange: ExchangeId,
}

impl TradeRecord {
    pub fn new(
        exchange: ExchangeId,
        symbol: &str,
        timestamp: i64,
        price: f64,
        buy_qty: f64,
        sell_qty: f64,
        buy_count: i64,
        sell_count: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            price,
            buy_qty,
            sell_qty,
            buy_count,
            sell_count,
            symbol: symbol.to_string(),
            exchange,
        }
    }
}

impl Entity for TradeRecord {
    const TABLE: &'static str = "trades";
    const COLUMNS: &'static [&'static str] = &[
        "timestamp",
        "price",
        "buy_qty",
        "sell_qty",
        "buy_count",
        "sell_count",
        "symbol",
        "exchange",
    ];

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
            price: row.get(2)?,
            buy_qty: row.get(3)?,
            sell_qty: row.get(4)?,
            buy_count: row.get(5)?,
            sell_count: row.get(6)?,
            symbol: row.get(7)?,
            exchange: parse_exchange(row, 8)?,
        })
    }

    fn values(&self) -> Vec<Box<dyn ToSql>> {
        vec![
            Box::new(self.timestamp),
            Box::new(self.price),
            Box::new(self.buy_qty),
            Box::new(self.sell_qty),
            Box::new(self.buy_count),
            Box::new(self.sell_count),
            Box::new(self.symbol.clone()),
            Box::new(self.exchange.as_str()),
        ]
    }

    fn natural_key(&self) -> Vec<(&'static str, Box<dyn ToSql>)> {
        vec![
            ("exchange", Box::new(self.exchange.as_str())),
            ("symbol", Box::new(self.symbol.clone())),
            ("timestamp", Box::new(self.timestamp)),
        ]
    }
}

/// One persisted orderbook snapshot; `data` holds the serialized ladders.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OrderbookRecord {
    pub id: Uuid,
    pub timestamp: i64,
    pub symbol: String,
    pub exchange: ExchangeId,
    pub data: Vec<u8>,
}

impl OrderbookRecord {
    pub fn new(exchange: ExchangeId, symbol: &str, timestamp: i64, data: Vec<u8>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            symbol: symbol.to_string(),
            exchange,
            data,
        }
    }
}

impl Entity for OrderbookRecord {
    const TABLE: &'static str = "orderbooks";
    const COLUMNS: &'static [&'static str] = &["timestamp", "symbol", "exchange", "data"];

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
            symbol: row.get(2)?,
            exchange: parse_exchange(row, 3)?,
            data: row.get(4)?,
        })
    }

    fn values(&self) -> Vec<Box<dyn ToSql>> {
        vec![
            Box::new(self.timestamp),
            Box::new(self.symbol.clone()),
            Box::new(self.exchange.as_str()),
            Box::new(self.data.clone()),
        ]
    }

    fn natural_key(&self) -> Vec<(&'static str, Box<dyn ToSql>)> {
        vec![
            ("exchange", Box::new(self.exchange.as_str())),
            ("symbol", Box::new(self.symbol.clone())),
            ("timestamp", Box::new(self.timestamp)),
        ]
    }
}

pub(crate) fn parse_uuid(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(idx)?;
    Uuid::parse_str(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

pub(crate) fn parse_exchange(row: &Row<'_>, idx: usize) -> rusqlite::Result<ExchangeId> {
    let raw: String = row.get(idx)?;
    raw.parse().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

pub(crate) fn parse_timeframe(row: &Row<'_>, idx: usize) -> rusqlite::Result<Timeframe> {
    let raw: String = row.get(idx)?;
    raw.parse().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
