use cipher_instrument::order::OrderStatus;
use smol_str::SmolStr;
use thiserror::Error;

/// Errors raised by order transitions and the exchange simulators.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExecutionError {
    #[error("asset {asset} balance insufficient: requested {requested}, available {available}")]
    InsufficientBalance {
        asset: SmolStr,
        requested: f64,
        available: f64,
    },

    #[error("margin insufficient: requested {requested}, available {available}")]
    InsufficientMargin { requested: f64, available: f64 },

    #[error("order invalid for exchange: {0}")]
    InvalidOrderForExchange(String),

    #[error("stream updates are only accepted while live trading")]
    NotLiveTrading,

    #[error("invalid order transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}
