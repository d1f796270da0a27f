use crate::mode::TradingMode;
use cipher_instrument::{exchange::ExchangeId, info::exchange_info, symbol};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Order lifecycle events that can be logged or notified individually.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogEvent {
    OrderSubmission,
    OrderExecution,
    OrderCancellation,
    PositionOpened,
    PositionIncreased,
    PositionReduced,
    PositionClosed,
    ShortedBalanceUpdate,
}

impl LogEvent {
    fn bit(&self) -> u32 {
        1 << (*self as u32)
    }
}

/// Bit-set of enabled [`LogEvent`]s.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Deserialize, Serialize)]
pub struct LogEventMask(u32);

impl LogEventMask {
    pub fn all() -> Self {
        Self(u32::MAX)
    }

    pub fn with(mut self, event: LogEvent) -> Self {
        self.0 |= event.bit();
        self
    }

    pub fn contains(&self, event: LogEvent) -> bool {
        self.0 & event.bit() != 0
    }
}

/// Typed run configuration.
///
/// Field names mirror the environment keys the core recognises, so a flat
/// env map deserializes straight into this.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub app_trading_mode: TradingMode,
    pub app_debug_mode: bool,
    pub app_is_unit_testing: bool,
    /// Dashy symbols the run may reference; dashless inputs resolve against
    /// this list before the suffix table.
    pub app_considering_symbols: Vec<String>,
    pub env_data_warmup_candles_num: usize,
    /// Which order events emit log lines while debugging.
    pub env_logging_events: LogEventMask,
    pub env_notifications_events_submitted_orders: bool,
    pub env_notifications_events_executed_orders: bool,
    pub env_notifications_events_cancelled_orders: bool,
    /// Per-exchange taker-fee overrides; venues not listed use the catalog.
    pub env_exchange_fees: HashMap<ExchangeId, f64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_trading_mode: TradingMode::Backtest,
            app_debug_mode: false,
            app_is_unit_testing: false,
            app_considering_symbols: Vec::new(),
            env_data_warmup_candles_num: 240,
            env_logging_events: LogEventMask::all(),
            env_notifications_events_submitted_orders: true,
            env_notifications_events_executed_orders: true,
            env_notifications_events_cancelled_orders: true,
            env_exchange_fees: HashMap::new(),
        }
    }
}

impl Config {
    /// Taker fee for `exchange`: the configured override, else the catalog.
    pub fn fee_for(&self, exchange: ExchangeId) -> f64 {
        self.env_exchange_fees
            .get(&exchange)
            .copied()
            .unwrap_or_else(|| exchange_info(exchange).fee)
    }

    /// Whether a debug line for `event` should be emitted.
    pub fn is_debuggable(&self, event: LogEvent) -> bool {
        self.app_debug_mode && self.env_logging_events.contains(event)
    }

    /// Normalize a symbol, preferring the considering-symbols list so venue
    /// quirks (eg/ multi-part quote assets) resolve the way the run expects.
    pub fn dashy_symbol(&self, raw: &str) -> String {
        if !raw.contains('-') {
            for candidate in &self.app_considering_symbols {
                if symbol::dashless_symbol(candidate) == raw {
                    return candidate.clone();
                }
            }
        }
        symbol::dashy_symbol(raw)
    }

    pub fn should_execute_silently(&self) -> bool {
        self.app_trading_mode
            .should_execute_silently(self.app_is_unit_testing)
    }
}
