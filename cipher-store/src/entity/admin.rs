use crate::entity::{
    Entity, Filter,
    market::{parse_exchange, parse_uuid},
};
use cipher_instrument::exchange::ExchangeId;
use rusqlite::{Row, ToSql};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// One persisted log line.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LogRecord {
    pub id: Uuid,
    pub session_id: Option<Uuid>,
    pub timestamp: i64,
    pub message: String,
    pub level: String,
}

impl LogRecord {
    pub fn new(session_id: Option<Uuid>, timestamp: i64, message: &str, level: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id,
            timestamp,
            message: message.to_string(),
            level: level.to_string(),
        }
    }
}

impl Entity for LogRecord {
    const TABLE: &'static str = "logs";
    const COLUMNS: &'static [&'static str] = &["session_id", "timestamp", "message", "level"];

    fn id(&self) -> Uuid {
        self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let session_id: Option<String> = row.get(1)?;
        Ok(Self {
            id: parse_uuid(row, 0)?,
            session_id: session_id.and_then(|raw| Uuid::parse_str(&raw).ok()),
            timestamp: row.get(2)?,
            message: row.get(3)?,
            level: row.get(4)?,
        })
    }

    fn values(&self) -> Vec<Box<dyn ToSql>> {
        vec![
            Box::new(self.session_id.map(|id| id.to_string())),
            Box::new(self.timestamp),
            Box::new(self.message.clone()),
            Box::new(self.level.clone()),
        ]
    }

    fn natural_key(&self) -> Vec<(&'static str, Box<dyn ToSql>)> {
        vec![("id", Box::new(self.id.to_string()))]
    }
}

/// Conjunctive log query.
#[derive(Debug, Clone, Default)]
pub struct LogFilter {
    pub session_id: Option<Uuid>,
    pub level: Option<String>,
    pub timestamp_start: Option<i64>,
    pub timestamp_end: Option<i64>,
}

impl Filter for LogFilter {
    fn clauses(&self) -> Vec<(String, Box<dyn ToSql>)> {
        let mut clauses: Vec<(String, Box<dyn ToSql>)> = Vec::new();
        if let Some(session_id) = self.session_id {
            clauses.push(("session_id = ?".to_string(), Box::new(session_id.to_string())));
        }
        if let Some(level) = &self.level {
            clauses.push(("level = ?".to_string(), Box::new(level.clone())));
        }
        if let Some(start) = self.timestamp_start {
            clauses.push(("timestamp >= ?".to_string(), Box::new(start)));
        }
        if let Some(end) = self.timestamp_end {
            clauses.push(("timestamp <= ?".to_string(), Box::new(end)));
        }
        clauses
    }
}

/// Key/value configuration row with a JSON payload.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OptionRecord {
    pub id: Uuid,
    pub updated_at: i64,
    pub option_type: String,
    pub value: Value,
}

impl OptionRecord {
    pub fn new(option_type: &str, value: Value, updated_at: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            updated_at,
            option_type: option_type.to_string(),
            value,
        }
    }
}

impl Entity for OptionRecord {
    const TABLE: &'static str = "options";
    const COLUMNS: &'static [&'static str] = &["updated_at", "option_type", "value"];

    fn id(&self) -> Uuid {
        self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let value: String = row.get(3)?;
        Ok(Self {
            id: parse_uuid(row, 0)?,
            updated_at: row.get(1)?,
            option_type: row.get(2)?,
            value: serde_json::from_str(&value).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    3,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?,
        })
    }

    fn values(&self) -> Vec<Box<dyn ToSql>> {
        vec![
            Box::new(self.updated_at),
            Box::new(self.option_type.clone()),
            Box::new(self.value.to_string()),
        ]
    }

    fn natural_key(&self) -> Vec<(&'static str, Box<dyn ToSql>)> {
        vec![("option_type", Box::new(self.option_type.clone()))]
    }
}

/// Credentials for one live exchange account.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ExchangeApiKeys {
    pub id: Uuid,
    pub exchange_name: ExchangeId,
    pub name: String,
    pub api_key: String,
    pub api_secret: String,
    pub additional_fields: Value,
    pub created_at: i64,
}

impl ExchangeApiKeys {
    pub fn new(
        exchange_name: ExchangeId,
        name: &str,
        api_key: &str,
        api_secret: &str,
        created_at: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            exchange_name,
            name: name.to_string(),
            api_key: api_key.to_string(),
            api_secret: api_secret.to_string(),
            additional_fields: Value::Null,
            created_at,
        }
    }
}

impl Entity for ExchangeApiKeys {
    const TABLE: &'static str = "exchange_api_keys";
    const COLUMNS: &'static [&'static str] = &[
        "exchange_name",
        "name",
        "api_key",
        "api_secret",
        "additional_fields",
        "created_at",
    ];

    fn id(&self) -> Uuid {
        self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let additional: String = row.get(5)?;
        Ok(Self {
            id: parse_uuid(row, 0)?,
            exchange_name: parse_exchange(row, 1)?,
            name: row.get(2)?,
            api_key: row.get(3)?,
            api_secret: row.get(4)?,
            additional_fields: serde_json::from_str(&additional).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    5,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?,
            created_at: row.get(6)?,
        })
    }

    fn values(&self) -> Vec<Box<dyn ToSql>> {
        vec![
            Box::new(self.exchange_name.as_str()),
            Box::new(self.name.clone()),
            Box::new(self.api_key.clone()),
            Box::new(self.api_secret.clone()),
            Box::new(self.additional_fields.to_string()),
            Box::new(self.created_at),
        ]
    }

    fn natural_key(&self) -> Vec<(&'static str, Box<dyn ToSql>)> {
        vec![("name", Box::new(self.name.clone()))]
    }
}

/// Credentials for one notification driver.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NotificationApiKeys {
    pub id: Uuid,
    pub name: String,
    pub driver: String,
    pub fields: Value,
    pub created_at: i64,
}

impl NotificationApiKeys {
    pub fn new(name: &str, driver: &str, fields: Value, created_at: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            driver: driver.to_string(),
            fields,
            created_at,
        }
    }
}

impl Entity for NotificationApiKeys {
    const TABLE: &'static str = "notification_api_keys";
    const COLUMNS: &'static [&'static str] = &["name", "driver", "fields", "created_at"];

    fn id(&self) -> Uuid {
        self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let fields: String = row.get(3)?;
        Ok(Self {
            id: parse_uuid(row, 0)?,
            name: row.get(1)?,
            driver: row.get(2)?,
            fields: serde_json::from_str(&fields).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    3,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?,
            created_at: row.get(4)?,
        })
    }

    fn values(&self) -> Vec<Box<dyn ToSql>> {
        vec![
            Box::new(self.name.clone()),
            Box::new(self.driver.clone()),
            Box::new(self.fields.to_string()),
            Box::new(self.created_at),
        ]
    }

    fn natural_key(&self) -> Vec<(&'static str, Box<dyn ToSql>)> {
        vec![("name", Box::new(self.name.clone()))]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{entity, schema};
    use rusqlite::Connection;
    use serde_json::json;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        schema::init_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn log_round_trip_and_filter() {
        let conn = conn();
        let session = Uuid::new_v4();
        for (ts, level) in [(1_000, "info"), (2_000, "error"), (3_000, "info")] {
            let mut log = LogRecord::new(Some(session), ts, "engine tick", level);
            entity::save(&mut log, &conn, false).unwrap();
        }

        let filter = LogFilter {
            session_id: Some(session),
            level: Some("info".to_string()),
            timestamp_start: Some(2_000),
            ..LogFilter::default()
        };
        let found: Vec<LogRecord> = entity::find_by_filter(&conn, &filter).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].timestamp, 3_000);
    }

    #[test]
    fn option_upserts_by_type() {
        let conn = conn();
        let mut option = OptionRecord::new("watchlist", json!(["BTC-USDT"]), 1_000);
        entity::save(&mut option, &conn, true).unwrap();

        let mut updated = OptionRecord::new("watchlist", json!(["BTC-USDT", "ETH-USDT"]), 2_000);
        entity::save(&mut updated, &conn, true).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM options", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);

        let loaded: OptionRecord = entity::find_by_id(&conn, option.id).unwrap().unwrap();
        assert_eq!(loaded.value, json!(["BTC-USDT", "ETH-USDT"]));
    }

    #[test]
    fn api_keys_round_trip() {
        let conn = conn();
        let mut keys = ExchangeApiKeys::new(
            ExchangeId::BinanceSpot,
            "main-account",
            "key",
            "secret",
            1_000,
        );
        entity::save(&mut keys, &conn, false).unwrap();
        let loaded: ExchangeApiKeys = entity::find_by_id(&conn, keys.id).unwrap().unwrap();
        assert_eq!(loaded, keys);

        let mut notification = NotificationApiKeys::new(
            "alerts",
            "telegram",
            json!({"chat_id": "123"}),
            1_000,
        );
        entity::save(&mut notification, &conn, false).unwrap();
        let loaded: NotificationApiKeys =
            entity::find_by_id(&conn, notification.id).unwrap().unwrap();
        assert_eq!(loaded, notification);
    }
}
