use thiserror::Error;

/// Errors raised by the ring store and the market-data repositories.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("index out of range: {0}")]
    OutOfRange(i64),

    #[error("unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("row length {got} does not match column count {expected}")]
    ShapeMismatch { expected: usize, got: usize },

    #[error("routes have already been initialized")]
    RoutesAlreadySet,

    #[error("invalid orderbook payload: {0}")]
    InvalidOrderbook(String),
}
