use thiserror::Error;

/// Errors raised by the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("timed out waiting for a pooled connection")]
    ConnectionTimeout,

    #[error("connection pool is shutting down")]
    ShuttingDown,

    #[error("pooled connection failed its health check")]
    DeadConnection,

    #[error("ambiguous natural key for {entity}: {count} rows matched")]
    ConflictAmbiguity { entity: &'static str, count: usize },

    #[error("serialization failure: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl StoreError {
    /// Whether a retry has any chance of succeeding.
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::ConnectionTimeout | StoreError::DeadConnection => true,
            StoreError::Sqlite(rusqlite::Error::SqliteFailure(err, _)) => matches!(
                err.code,
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
            ),
            _ => false,
        }
    }
}
