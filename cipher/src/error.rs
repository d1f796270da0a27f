use cipher_data::error::DataError;
use cipher_execution::error::ExecutionError;
use cipher_instrument::{error::InstrumentError, exchange::ExchangeId};
use cipher_store::error::StoreError;
use thiserror::Error;
use uuid::Uuid;

/// Errors crossing the engine boundary.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("instrument: {0}")]
    Instrument(#[from] InstrumentError),

    #[error("market data: {0}")]
    Data(#[from] DataError),

    #[error("execution: {0}")]
    Execution(#[from] ExecutionError),

    #[error("store: {0}")]
    Store(#[from] StoreError),

    #[error("no simulator registered for exchange {0}")]
    UnknownExchange(ExchangeId),

    #[error("unknown order id {0}")]
    UnknownOrder(Uuid),

    #[error("no strategy bound to route {0}")]
    UnknownStrategy(String),

    #[error("strategy failed: {0}")]
    Strategy(String),
}
