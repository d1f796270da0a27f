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

//! # Cipher-Instrument
//! Core exchange, symbol, timeframe and money primitives shared by every other
//! Cipher Trader crate.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Defines the closed [`ExchangeId`](exchange::ExchangeId) set and the
/// per-exchange capability catalog.
pub mod exchange;

/// Errors raised by parsing and validation in this crate.
pub mod error;

/// Per-exchange capability catalog (fees, supported timeframes, modes).
pub mod info;

/// Composite key generation and parsing (`exchange-symbol[-timeframe]`).
pub mod key;

/// High-precision money arithmetic and live-mode rounding.
pub mod money;

/// Order-related enums: status, type, submission origin.
pub mod order;

/// Symbol normalization utilities (dashy/dashless forms, base/quote split).
pub mod symbol;

/// The closed [`Timeframe`](timeframe::Timeframe) catalog.
pub mod timeframe;

/// Millisecond-epoch timestamp conversions and duration formatting.
pub mod time;

/// Side of a trade or order.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    #[serde(alias = "BUY", alias = "b")]
    Buy,
    #[serde(alias = "SELL", alias = "s")]
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }

    /// The side that would undo this one.
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    /// Sign applied to quantities: +1 for buys, -1 for sells.
    pub fn sign(&self) -> f64 {
        match self {
            Side::Buy => 1.0,
            Side::Sell => -1.0,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Side {
    type Err = error::InstrumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buy" | "BUY" | "b" => Ok(Side::Buy),
            "sell" | "SELL" | "s" => Ok(Side::Sell),
            other => Err(error::InstrumentError::InvalidSide(other.to_string())),
        }
    }
}

/// Direction of a position.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize, Display,
)]
#[serde(rename_all = "snake_case")]
pub enum TradeType {
    #[display("long")]
    Long,
    #[display("short")]
    Short,
}

impl TradeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeType::Long => "long",
            TradeType::Short => "short",
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            TradeType::Long => TradeType::Short,
            TradeType::Short => TradeType::Long,
        }
    }
}

impl std::str::FromStr for TradeType {
    type Err = error::InstrumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "long" => Ok(TradeType::Long),
            "short" => Ok(TradeType::Short),
            other => Err(error::InstrumentError::InvalidTradeType(other.to_string())),
        }
    }
}

/// The [`TradeType`] a fresh order on `side` opens.
pub fn side_to_type(side: Side) -> TradeType {
    match side {
        Side::Buy => TradeType::Long,
        Side::Sell => TradeType::Short,
    }
}

/// The [`Side`] that opens a position of `trade_type`.
pub fn type_to_side(trade_type: TradeType) -> Side {
    match trade_type {
        TradeType::Long => Side::Buy,
        TradeType::Short => Side::Sell,
    }
}

/// The [`Side`] that closes a position of `trade_type`.
pub fn closing_side(trade_type: TradeType) -> Side {
    type_to_side(trade_type).opposite()
}
