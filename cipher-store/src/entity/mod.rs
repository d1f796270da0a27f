use crate::error::StoreError;
use rusqlite::{Connection, Row, ToSql};
use tracing::debug;
use uuid::Uuid;

/// Admin entities: logs, options, API keys.
pub mod admin;

/// Market-data entities: candles, tickers, trades, orderbook snapshots.
pub mod market;

/// Trading entities: orders, closed trades, daily balances.
pub mod trading;

pub use admin::{ExchangeApiKeys, LogFilter, LogRecord, NotificationApiKeys, OptionRecord};
pub use market::{
    CandleFilter, CandleRecord, OrderbookRecord, TickerFilter, TickerRecord, TradeRecord,
};
pub use trading::{ClosedTrade, ClosedTradeFilter, DailyBalance, OrderFill, OrderFilter};

/// A row-mapped domain entity.
///
/// Implementations list their columns once; the generic operations below
/// derive every statement from that. `id` is always the first column and a
/// UUIDv4 stored as its 36-char string form.
pub trait Entity: Sized {
    const TABLE: &'static str;

    /// Column names excluding `id`, in insert order.
    const COLUMNS: &'static [&'static str];

    fn id(&self) -> Uuid;

    fn set_id(&mut self, id: Uuid);

    /// Map a `SELECT id, <COLUMNS...>` row back to the entity.
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    /// Values matching [`Entity::COLUMNS`] order.
    fn values(&self) -> Vec<Box<dyn ToSql>>;

    /// Conjunctive clauses identifying "the same" row for idempotent saves.
    fn natural_key(&self) -> Vec<(&'static str, Box<dyn ToSql>)>;
}

/// Conjunctive query filter over an entity's columns.
pub trait Filter {
    /// `(column expression, value)` pairs, ANDed together. Range fields use
    /// comparison expressions, eg/ `("timestamp >= ?", start)`.
    fn clauses(&self) -> Vec<(String, Box<dyn ToSql>)>;
}

fn select_sql<E: Entity>() -> String {
    format!("SELECT id, {} FROM {}", E::COLUMNS.join(", "), E::TABLE)
}

/// Fetch one entity by primary key.
pub fn find_by_id<E: Entity>(conn: &Connection, id: Uuid) -> Result<Option<E>, StoreError> {
    let sql = format!("{} WHERE id = ?", select_sql::<E>());
    let mut stmt = conn.prepare_cached(&sql)?;
    let mut rows = stmt.query_map([id.to_string()], |row| E::from_row(row))?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

/// Fetch every entity matching the filter's conjunction.
pub fn find_by_filter<E: Entity, F: Filter>(
    conn: &Connection,
    filter: &F,
) -> Result<Vec<E>, StoreError> {
    let clauses = filter.clauses();
    let mut sql = select_sql::<E>();
    if !clauses.is_empty() {
        let predicates: Vec<&str> = clauses.iter().map(|(expr, _)| expr.as_str()).collect();
        sql.push_str(" WHERE ");
        sql.push_str(&predicates.join(" AND "));
    }

    let params: Vec<&dyn ToSql> = clauses.iter().map(|(_, value)| value.as_ref()).collect();
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params.as_slice(), |row| E::from_row(row))?;
    let mut found = Vec::new();
    for row in rows {
        found.push(row?);
    }
    Ok(found)
}

/// Idempotent insert keyed on the entity's natural key.
///
/// No matching row inserts; exactly one match updates it (when
/// `update_on_conflict`) and adopts its id; several matches indicate a
/// broken natural key and fail with
/// [`StoreError::ConflictAmbiguity`].
pub fn save<E: Entity>(
    entity: &mut E,
    conn: &Connection,
    update_on_conflict: bool,
) -> Result<(), StoreError> {
    let key = entity.natural_key();
    // `IS` instead of `=` so nullable key columns (eg/ DailyBalance
    // identifier) still match their own NULLs.
    let predicates: Vec<String> = key.iter().map(|(col, _)| format!("{col} IS ?")).collect();
    let params: Vec<&dyn ToSql> = key.iter().map(|(_, value)| value.as_ref()).collect();

    let sql = format!(
        "SELECT id FROM {} WHERE {}",
        E::TABLE,
        predicates.join(" AND ")
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    let ids: Vec<String> = stmt
        .query_map(params.as_slice(), |row| row.get::<_, String>(0))?
        .collect::<Result<_, _>>()?;

    match ids.len() {
        0 => {
            let placeholders = vec!["?"; E::COLUMNS.len() + 1].join(", ");
            let sql = format!(
                "INSERT INTO {} (id, {}) VALUES ({})",
                E::TABLE,
                E::COLUMNS.join(", "),
                placeholders
            );
            let id = entity.id().to_string();
            let values = entity.values();
            let mut params: Vec<&dyn ToSql> = vec![&id];
            params.extend(values.iter().map(|value| value.as_ref()));
            conn.prepare_cached(&sql)?.execute(params.as_slice())?;
            Ok(())
        }
        1 => {
            if !update_on_conflict {
                debug!(table = E::TABLE, "row exists; save skipped");
                return Ok(());
            }
            let existing = Uuid::parse_str(&ids[0]).unwrap_or_else(|_| entity.id());
            entity.set_id(existing);

            let assignments: Vec<String> =
                E::COLUMNS.iter().map(|col| format!("{col} = ?")).collect();
            let sql = format!(
                "UPDATE {} SET {} WHERE id = ?",
                E::TABLE,
                assignments.join(", ")
            );
            let id = existing.to_string();
            let values = entity.values();
            let mut params: Vec<&dyn ToSql> =
                values.iter().map(|value| value.as_ref()).collect();
            params.push(&id);
            conn.prepare_cached(&sql)?.execute(params.as_slice())?;
            Ok(())
        }
        count => Err(StoreError::ConflictAmbiguity {
            entity: E::TABLE,
            count,
        }),
    }
}

/// Insert many entities in a single statement.
pub fn batch_save<E: Entity>(entities: &[E], conn: &Connection) -> Result<(), StoreError> {
    if entities.is_empty() {
        return Ok(());
    }

    let row_placeholders = format!("({})", vec!["?"; E::COLUMNS.len() + 1].join(", "));
    let sql = format!(
        "INSERT INTO {} (id, {}) VALUES {}",
        E::TABLE,
        E::COLUMNS.join(", "),
        vec![row_placeholders.as_str(); entities.len()].join(", ")
    );

    let ids: Vec<String> = entities.iter().map(|e| e.id().to_string()).collect();
    let values: Vec<Vec<Box<dyn ToSql>>> = entities.iter().map(|e| e.values()).collect();

    let mut params: Vec<&dyn ToSql> = Vec::with_capacity(entities.len() * (E::COLUMNS.len() + 1));
    for (id, row) in ids.iter().zip(&values) {
        params.push(id);
        params.extend(row.iter().map(|value| value.as_ref()));
    }
    conn.prepare(&sql)?.execute(params.as_slice())?;
    Ok(())
}
