use thiserror::Error;

/// Errors produced when parsing or validating instrument primitives.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Error)]
pub enum InstrumentError {
    #[error("invalid exchange: {0}")]
    InvalidExchange(String),

    #[error("invalid timeframe: {0}")]
    InvalidTimeframe(String),

    #[error("invalid side: {0}")]
    InvalidSide(String),

    #[error("invalid trade type: {0}")]
    InvalidTradeType(String),

    #[error("invalid order status: {0}")]
    InvalidOrderStatus(String),

    #[error("invalid order type: {0}")]
    InvalidOrderType(String),

    #[error("invalid composite key: {0}")]
    InvalidCompositeKey(String),

    #[error("invalid iso8601 datetime: {0}")]
    InvalidIso8601(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}
