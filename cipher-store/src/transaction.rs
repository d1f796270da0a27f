use crate::error::StoreError;
use rusqlite::{Connection, Transaction};
use std::ops::Deref;
use tracing::debug;

/// Scoped transaction: commit is explicit, rollback is automatic on drop.
///
/// Nesting is rejected statically: opening a guard takes `&mut Connection`,
/// and the guard only ever lends out `&Connection`.
pub struct TransactionGuard<'conn> {
    tx: Option<Transaction<'conn>>,
}

impl std::fmt::Debug for TransactionGuard<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionGuard")
            .field("open", &self.tx.is_some())
            .finish()
    }
}

impl<'conn> TransactionGuard<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Result<Self, StoreError> {
        let tx = conn.transaction()?;
        Ok(Self { tx: Some(tx) })
    }

    /// Commit the transaction; consumes the guard.
    pub fn commit(mut self) -> Result<(), StoreError> {
        if let Some(tx) = self.tx.take() {
            tx.commit()?;
        }
        Ok(())
    }

    /// Roll back explicitly instead of waiting for drop.
    pub fn rollback(mut self) -> Result<(), StoreError> {
        if let Some(tx) = self.tx.take() {
            tx.rollback()?;
        }
        Ok(())
    }
}

impl Deref for TransactionGuard<'_> {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        self.tx.as_ref().expect("transaction open until consumed")
    }
}

impl Drop for TransactionGuard<'_> {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            debug!("transaction dropped without commit; rolling back");
            let _ = tx.rollback();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (x INTEGER)").unwrap();
        conn
    }

    fn count(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM t", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn commit_persists() {
        let mut conn = conn();
        let tx = TransactionGuard::new(&mut conn).unwrap();
        tx.execute("INSERT INTO t VALUES (1)", []).unwrap();
        tx.commit().unwrap();
        assert_eq!(count(&conn), 1);
    }

    #[test]
    fn drop_rolls_back() {
        let mut conn = conn();
        {
            let tx = TransactionGuard::new(&mut conn).unwrap();
            tx.execute("INSERT INTO t VALUES (1)", []).unwrap();
        }
        assert_eq!(count(&conn), 0);
    }

    #[test]
    fn explicit_rollback() {
        let mut conn = conn();
        let tx = TransactionGuard::new(&mut conn).unwrap();
        tx.execute("INSERT INTO t VALUES (1)", []).unwrap();
        tx.rollback().unwrap();
        assert_eq!(count(&conn), 0);
    }
}
