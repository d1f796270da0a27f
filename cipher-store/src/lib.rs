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

//! # Cipher-Store
//! SQLite persistence for Cipher Trader: typed entities with a conjunctive
//! filter DSL, conflict-aware saves, batched inserts, a bounded connection
//! pool, transaction scoping and one-shot graceful shutdown.

/// Facade owning the pool and the shutdown coordinator.
pub mod database;

/// Typed entities and the generic find/save operations over them.
pub mod entity;

/// Errors raised by the persistence layer.
pub mod error;

/// Bounded connection pool with health-checked returns.
pub mod pool;

/// Retry wrapper for idempotent operations.
pub mod retry;

/// Table definitions.
pub mod schema;

/// One-shot, process-wide shutdown coordination.
pub mod shutdown;

/// Commit-or-rollback transaction scoping.
pub mod transaction;

pub use database::Database;
pub use entity::{Entity, Filter, batch_save, find_by_filter, find_by_id, save};
pub use error::StoreError;
pub use pool::{ConnectionPool, PoolConfig, PooledConnection};
pub use retry::execute_with_retry;
pub use shutdown::ShutdownCoordinator;
pub use transaction::TransactionGuard;
