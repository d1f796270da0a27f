use crate::{error::StoreError, schema, shutdown::ShutdownCoordinator};
use parking_lot::{Condvar, Mutex};
use rusqlite::Connection;
use std::{
    ops::{Deref, DerefMut},
    sync::Arc,
    time::{Duration, Instant},
};
use tracing::{debug, warn};

/// Connection-pool parameters.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// SQLite database path.
    pub path: String,
    pub max_connections: usize,
    pub acquire_timeout: Duration,
}

impl PoolConfig {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            max_connections: 20,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

/// Bounded pool of SQLite connections.
///
/// Acquisition blocks up to the configured timeout; returns are
/// health-checked (`SELECT 1`) and dead connections are replaced. The pool
/// owns every connection for its whole lifetime; handles borrow the pool,
/// so one cannot outlive it.
pub struct ConnectionPool {
    config: PoolConfig,
    shutdown: Arc<ShutdownCoordinator>,
    state: Mutex<PoolState>,
    available: Condvar,
    returned: Condvar,
}

#[derive(Default)]
struct PoolState {
    idle: Vec<Connection>,
    /// Idle plus checked-out connections.
    total: usize,
}

impl std::fmt::Debug for ConnectionPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ConnectionPool")
            .field("path", &self.config.path)
            .field("idle", &state.idle.len())
            .field("total", &state.total)
            .finish()
    }
}

impl ConnectionPool {
    pub fn new(config: PoolConfig, shutdown: Arc<ShutdownCoordinator>) -> Self {
        Self {
            config,
            shutdown,
            state: Mutex::new(PoolState::default()),
            available: Condvar::new(),
            returned: Condvar::new(),
        }
    }

    fn open_connection(&self) -> Result<Connection, StoreError> {
        let conn = Connection::open(&self.config.path)?;
        schema::apply_pragmas(&conn)?;
        Ok(conn)
    }

    /// Borrow a connection, waiting up to the acquire timeout.
    pub fn connection(&self) -> Result<PooledConnection<'_>, StoreError> {
        let deadline = Instant::now() + self.config.acquire_timeout;
        let mut state = self.state.lock();

        loop {
            if self.shutdown.is_shutting_down() {
                return Err(StoreError::ShuttingDown);
            }
            if let Some(conn) = state.idle.pop() {
                return Ok(PooledConnection {
                    pool: self,
                    conn: Some(conn),
                });
            }
            if state.total < self.config.max_connections {
                state.total += 1;
                drop(state);
                return match self.open_connection() {
                    Ok(conn) => Ok(PooledConnection {
                        pool: self,
                        conn: Some(conn),
                    }),
                    Err(e) => {
                        self.state.lock().total -= 1;
                        self.returned.notify_all();
                        Err(e)
                    }
                };
            }
            if self.available.wait_until(&mut state, deadline).timed_out() {
                return Err(StoreError::ConnectionTimeout);
            }
        }
    }

    /// Accept a connection back, health-checking it first.
    fn give_back(&self, conn: Connection) {
        let healthy = conn
            .query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .is_ok();

        if self.shutdown.is_shutting_down() {
            drop(conn);
            self.state.lock().total -= 1;
            self.returned.notify_all();
            return;
        }

        if healthy {
            self.state.lock().idle.push(conn);
            self.available.notify_one();
            return;
        }

        warn!("pooled connection failed health check; replacing");
        drop(conn);
        match self.open_connection() {
            Ok(fresh) => {
                self.state.lock().idle.push(fresh);
                self.available.notify_one();
            }
            Err(e) => {
                warn!(error = %e, "could not replace dead connection");
                self.state.lock().total -= 1;
                self.returned.notify_all();
            }
        }
    }

    /// Wake every thread blocked in [`ConnectionPool::connection`] so it can
    /// observe the shutdown flag.
    pub fn interrupt_waiters(&self) {
        self.available.notify_all();
    }

    /// Drop idle connections and block until checked-out ones return.
    pub fn wait_for_connections_to_close(&self) {
        let mut state = self.state.lock();
        let drained = state.idle.drain(..).count();
        state.total -= drained;
        while state.total > 0 {
            self.returned.wait(&mut state);
        }
        debug!("all pooled connections closed");
    }

    /// `(idle, total)` connection counts.
    pub fn stats(&self) -> (usize, usize) {
        let state = self.state.lock();
        (state.idle.len(), state.total)
    }
}

/// Scoped borrow of one pooled connection; returns to the pool on drop.
pub struct PooledConnection<'a> {
    pool: &'a ConnectionPool,
    conn: Option<Connection>,
}

impl std::fmt::Debug for PooledConnection<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledConnection").finish_non_exhaustive()
    }
}

impl Deref for PooledConnection<'_> {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        self.conn.as_ref().expect("connection present until drop")
    }
}

impl DerefMut for PooledConnection<'_> {
    fn deref_mut(&mut self) -> &mut Connection {
        self.conn.as_mut().expect("connection present until drop")
    }
}

impl Drop for PooledConnection<'_> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.pool.give_back(conn);
        }
    }
}
