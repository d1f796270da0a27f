use rusqlite::Connection;

/// Table and index definitions.
///
/// UUIDs live in 36-char TEXT columns, timestamps are epoch-millisecond
/// INTEGERs, money amounts are REALs, and free-form payloads are JSON TEXT.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS candles (
    id TEXT PRIMARY KEY,
    timestamp INTEGER NOT NULL,
    open REAL NOT NULL,
    close REAL NOT NULL,
    high REAL NOT NULL,
    low REAL NOT NULL,
    volume REAL NOT NULL,
    exchange TEXT NOT NULL,
    symbol TEXT NOT NULL,
    timeframe TEXT NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_candles_natural
    ON candles (exchange, symbol, timeframe, timestamp);

CREATE TABLE IF NOT EXISTS orders (
    id TEXT PRIMARY KEY,
    trade_id TEXT,
    session_id TEXT,
    exchange_id TEXT,
    symbol TEXT NOT NULL,
    exchange TEXT NOT NULL,
    order_side TEXT NOT NULL,
    order_type TEXT NOT NULL,
    reduce_only INTEGER NOT NULL,
    qty REAL NOT NULL,
    filled_qty REAL NOT NULL,
    price REAL,
    status TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    executed_at INTEGER,
    canceled_at INTEGER,
    vars TEXT NOT NULL,
    submitted_via TEXT
);
CREATE INDEX IF NOT EXISTS idx_orders_session ON orders (session_id);
CREATE INDEX IF NOT EXISTS idx_orders_symbol ON orders (exchange, symbol);

CREATE TABLE IF NOT EXISTS closed_trades (
    id TEXT PRIMARY KEY,
    strategy_name TEXT NOT NULL,
    symbol TEXT NOT NULL,
    exchange TEXT NOT NULL,
    position_type TEXT NOT NULL,
    timeframe TEXT NOT NULL,
    opened_at INTEGER NOT NULL,
    closed_at INTEGER NOT NULL,
    leverage REAL NOT NULL,
    buy_orders TEXT NOT NULL,
    sell_orders TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_closed_trades_strategy
    ON closed_trades (strategy_name, exchange, symbol);

CREATE TABLE IF NOT EXISTS daily_balances (
    id TEXT PRIMARY KEY,
    timestamp INTEGER NOT NULL,
    identifier TEXT,
    exchange TEXT NOT NULL,
    asset TEXT NOT NULL,
    balance REAL NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_daily_balances_natural
    ON daily_balances (identifier, exchange, asset, timestamp);

CREATE TABLE IF NOT EXISTS tickers (
    id TEXT PRIMARY KEY,
    timestamp INTEGER NOT NULL,
    last_price REAL NOT NULL,
    volume REAL NOT NULL,
    high_price REAL NOT NULL,
    low_price REAL NOT NULL,
    symbol TEXT NOT NULL,
    exchange TEXT NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_tickers_natural
    ON tickers (exchange, symbol, timestamp);

CREATE TABLE IF NOT EXISTS trades (
    id TEXT PRIMARY KEY,
    timestamp INTEGER NOT NULL,
    price REAL NOT NULL,
    buy_qty REAL NOT NULL,
    sell_qty REAL NOT NULL,
    buy_count INTEGER NOT NULL,
    sell_count INTEGER NOT NULL,
    symbol TEXT NOT NULL,
    exchange TEXT NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_trades_natural
    ON trades (exchange, symbol, timestamp);

CREATE TABLE IF NOT EXISTS orderbooks (
    id TEXT PRIMARY KEY,
    timestamp INTEGER NOT NULL,
    symbol TEXT NOT NULL,
    exchange TEXT NOT NULL,
    data BLOB NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_orderbooks_natural
    ON orderbooks (exchange, symbol, timestamp);

CREATE TABLE IF NOT EXISTS logs (
    id TEXT PRIMARY KEY,
    session_id TEXT,
    timestamp INTEGER NOT NULL,
    message TEXT NOT NULL,
    level TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_logs_session ON logs (session_id, timestamp);

CREATE TABLE IF NOT EXISTS options (
    id TEXT PRIMARY KEY,
    updated_at INTEGER NOT NULL,
    option_type TEXT NOT NULL,
    value TEXT NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_options_type ON options (option_type);

CREATE TABLE IF NOT EXISTS exchange_api_keys (
    id TEXT PRIMARY KEY,
    exchange_name TEXT NOT NULL,
    name TEXT NOT NULL,
    api_key TEXT NOT NULL,
    api_secret TEXT NOT NULL,
    additional_fields TEXT NOT NULL,
    created_at INTEGER NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_exchange_api_keys_name
    ON exchange_api_keys (name);

CREATE TABLE IF NOT EXISTS notification_api_keys (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    driver TEXT NOT NULL,
    fields TEXT NOT NULL,
    created_at INTEGER NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_notification_api_keys_name
    ON notification_api_keys (name);
"#;

/// Connection-level pragmas applied to every pooled connection.
pub const PRAGMA_SQL: &str = r#"
PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;
PRAGMA foreign_keys = ON;
PRAGMA busy_timeout = 5000;
"#;

/// Create every table and index.
pub fn init_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)
}

/// Apply per-connection pragmas.
pub fn apply_pragmas(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(PRAGMA_SQL)
}
