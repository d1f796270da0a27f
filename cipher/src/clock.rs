use crate::mode::TradingMode;
use chrono::Utc;
use parking_lot::RwLock;
use std::sync::Arc;

/// Defines how the engine determines the current time.
///
/// Live modes read the wall clock on every call; backtests freeze time at
/// the simulated candle's close and advance it as candles replay.
pub trait EngineClock: Send + Sync + std::fmt::Debug {
    /// Current UTC time in epoch milliseconds.
    fn now_ms(&self) -> i64;
}

/// Wall-clock time.
#[derive(Debug, Copy, Clone, Default)]
pub struct LiveClock;

impl EngineClock for LiveClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Frozen clock fed by the backtest replay loop.
///
/// Cloning shares the underlying instant, so the ingest side advances the
/// same clock every reader samples.
#[derive(Debug, Clone, Default)]
pub struct StoreClock {
    frozen: Arc<RwLock<i64>>,
}

impl StoreClock {
    pub fn new(start_ms: i64) -> Self {
        Self {
            frozen: Arc::new(RwLock::new(start_ms)),
        }
    }

    /// Advance to a newer simulated instant; stale updates are ignored.
    pub fn advance(&self, timestamp_ms: i64) {
        let mut frozen = self.frozen.write();
        if timestamp_ms > *frozen {
            *frozen = timestamp_ms;
        }
    }
}

impl EngineClock for StoreClock {
    fn now_ms(&self) -> i64 {
        *self.frozen.read()
    }
}

/// The clock a mode calls for.
pub fn clock_for_mode(mode: TradingMode) -> Box<dyn EngineClock> {
    if mode.is_backtesting() {
        Box::new(StoreClock::default())
    } else {
        Box::new(LiveClock)
    }
}
