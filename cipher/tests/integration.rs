use cipher::{Engine, config::Config, engine::OrderUpdate, mode::TradingMode};
use cipher_data::route::{Route, Router};
use cipher_instrument::{
    Side,
    exchange::ExchangeId,
    order::{OrderStatus, OrderType},
    timeframe::Timeframe,
};
use cipher_store::{
    Database,
    entity::{self, CandleFilter, CandleRecord, OrderFilter},
    pool::PoolConfig,
};
use cipher_execution::order::Order;

fn temp_database(tag: &str) -> Database {
    let mut path = std::env::temp_dir();
    path.push(format!("cipher-it-{tag}-{}.sqlite3", std::process::id()));
    let _ = std::fs::remove_file(&path);
    Database::open(PoolConfig::new(&path.to_string_lossy())).unwrap()
}

fn btc_router() -> Router {
    let mut router = Router::default();
    router
        .init(
            vec![
                Route::new(ExchangeId::BinanceSpot, "BTC-USDT", Some(Timeframe::Hour1))
                    .with_strategy("integration"),
            ],
            vec![],
        )
        .unwrap();
    router
}

#[test]
fn order_state_changes_are_persisted_per_session() {
    let database = temp_database("orders");
    let mut engine = Engine::new(Config::default(), btc_router()).with_database(database.clone());

    let id = engine
        .submit_order(
            ExchangeId::BinanceSpot,
            "BTC-USDT",
            Side::Buy,
            OrderType::Limit,
            1.0,
            Some(5_000.0),
            false,
        )
        .unwrap();

    {
        let conn = database.connection().unwrap();
        let filter = OrderFilter {
            session_id: Some(engine.session_id()),
            ..OrderFilter::default()
        };
        let rows: Vec<Order> = entity::find_by_filter(&conn, &filter).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, OrderStatus::Active);
    }

    // Executing through the stream path updates the same row in place.
    engine
        .on_order_update(OrderUpdate {
            id,
            status: OrderStatus::Executed,
            filled_qty: 1.0,
            exchange_id: Some("V-77".to_string()),
            price: Some(5_000.0),
        })
        .unwrap();

    let conn = database.connection().unwrap();
    let filter = OrderFilter {
        session_id: Some(engine.session_id()),
        ..OrderFilter::default()
    };
    let rows: Vec<Order> = entity::find_by_filter(&conn, &filter).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].status, OrderStatus::Executed);
    assert_eq!(rows[0].exchange_id.as_deref(), Some("V-77"));
}

#[test]
fn optimize_mode_never_persists() {
    let database = temp_database("optimize");
    let config = Config {
        app_trading_mode: TradingMode::Optimize,
        ..Config::default()
    };
    let mut engine = Engine::new(config, btc_router()).with_database(database.clone());

    engine
        .submit_order(
            ExchangeId::BinanceSpot,
            "BTC-USDT",
            Side::Buy,
            OrderType::Limit,
            1.0,
            Some(5_000.0),
            false,
        )
        .unwrap();

    let conn = database.connection().unwrap();
    let rows: Vec<Order> = entity::find_by_filter(&conn, &OrderFilter::default()).unwrap();
    assert!(rows.is_empty());
}

#[test]
fn daily_balances_record_once_per_day() {
    let database = temp_database("balances");
    let engine = Engine::new(Config::default(), btc_router()).with_database(database.clone());

    engine.record_daily_balances().unwrap();
    engine.record_daily_balances().unwrap();

    let conn = database.connection().unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM daily_balances", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn candle_batch_survives_engine_shutdown() {
    let database = temp_database("shutdown");
    let engine = Engine::new(Config::default(), btc_router()).with_database(database.clone());

    {
        let conn = database.connection().unwrap();
        let candles: Vec<CandleRecord> = (0..24)
            .map(|i| {
                CandleRecord::new(
                    ExchangeId::BinanceSpot,
                    "BTC-USDT",
                    Timeframe::Hour1,
                    i * 3_600_000,
                    100.0,
                    101.0,
                    102.0,
                    99.0,
                    10.0,
                )
            })
            .collect();
        entity::batch_save(&candles, &conn).unwrap();
    }

    engine.shutdown();
    assert!(database.is_shutting_down());
    assert!(database.connection().is_err());

    // Data written before shutdown is durable: reopen and count.
    let reopened = Database::open(PoolConfig::new(
        &std::env::temp_dir()
            .join(format!("cipher-it-shutdown-{}.sqlite3", std::process::id()))
            .to_string_lossy(),
    ))
    .unwrap();
    let conn = reopened.connection().unwrap();
    let filter = CandleFilter {
        exchange: Some(ExchangeId::BinanceSpot),
        symbol: Some("BTC-USDT".to_string()),
        ..CandleFilter::default()
    };
    let rows: Vec<CandleRecord> = entity::find_by_filter(&conn, &filter).unwrap();
    assert_eq!(rows.len(), 24);
}
