use crate::{
    error::StoreError,
    pool::{ConnectionPool, PoolConfig, PooledConnection},
    schema,
    shutdown::ShutdownCoordinator,
};
use std::sync::Arc;
use tracing::info;

/// Facade owning the pool and the shutdown coordinator for one database.
///
/// Cloning is cheap and shares the underlying pool.
#[derive(Debug, Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
}

#[derive(Debug)]
struct DatabaseInner {
    pool: ConnectionPool,
    shutdown: Arc<ShutdownCoordinator>,
}

impl Database {
    /// Open the database, create the schema, and prepare the pool.
    pub fn open(config: PoolConfig) -> Result<Self, StoreError> {
        let shutdown = Arc::new(ShutdownCoordinator::new());
        let pool = ConnectionPool::new(config, Arc::clone(&shutdown));
        let database = Self {
            inner: Arc::new(DatabaseInner { pool, shutdown }),
        };
        schema::init_schema(&*database.connection()?)?;
        Ok(database)
    }

    /// Borrow a pooled connection.
    pub fn connection(&self) -> Result<PooledConnection<'_>, StoreError> {
        self.inner.pool.connection()
    }

    pub fn shutdown_coordinator(&self) -> &ShutdownCoordinator {
        &self.inner.shutdown
    }

    pub fn is_shutting_down(&self) -> bool {
        self.inner.shutdown.is_shutting_down()
    }

    /// Run the full shutdown sequence. Idempotent: later calls return
    /// immediately.
    pub fn shutdown(&self) {
        self.inner.shutdown_sequence();
    }

    /// Route SIGINT/SIGTERM into [`Database::shutdown`].
    ///
    /// SIGPIPE needs no handling: the Rust runtime already ignores it.
    pub fn install_signal_handlers(&self) -> Result<(), ctrlc::Error> {
        let inner = Arc::clone(&self.inner);
        ctrlc::set_handler(move || {
            info!("termination signal received; shutting down store");
            inner.shutdown_sequence();
        })
    }
}

impl DatabaseInner {
    fn shutdown_sequence(&self) {
        if !self.shutdown.begin() {
            return;
        }
        self.pool.interrupt_waiters();
        self.shutdown.run_pre_hooks();
        self.pool.wait_for_connections_to_close();
        self.shutdown.run_completion_hooks();
        info!("store shutdown complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn temp_config(tag: &str) -> PoolConfig {
        let mut path = std::env::temp_dir();
        path.push(format!("cipher-db-{tag}-{}.sqlite3", std::process::id()));
        let _ = std::fs::remove_file(&path);
        PoolConfig::new(&path.to_string_lossy())
    }

    #[test]
    fn open_creates_schema() {
        let database = Database::open(temp_config("schema")).unwrap();
        let conn = database.connection().unwrap();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert!(count >= 11);
    }

    #[test]
    fn shutdown_runs_hooks_in_phases() {
        let database = Database::open(temp_config("hooks")).unwrap();
        let phase = Arc::new(AtomicUsize::new(0));

        let p = Arc::clone(&phase);
        database.shutdown_coordinator().register_shutdown_hook(move || {
            p.store(1, Ordering::SeqCst);
        });
        let p = Arc::clone(&phase);
        database
            .shutdown_coordinator()
            .register_completion_hook(move || {
                p.store(2, Ordering::SeqCst);
            });

        database.shutdown();
        assert_eq!(phase.load(Ordering::SeqCst), 2);
        assert!(database.is_shutting_down());

        // Connections are refused afterwards, and shutdown stays idempotent.
        assert!(matches!(
            database.connection().unwrap_err(),
            StoreError::ShuttingDown
        ));
        database.shutdown();
    }
}
