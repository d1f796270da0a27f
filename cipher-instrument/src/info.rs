use crate::{
    exchange::{ExchangeId, ExchangeKind},
    timeframe::Timeframe,
};
use serde::{Deserialize, Serialize};

/// Margin modes a derivatives venue supports.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum LeverageMode {
    Cross,
    Isolated,
}

/// Which run modes a venue is available in.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize, Serialize)]
pub struct ExchangeModes {
    pub backtesting: bool,
    pub live_trading: bool,
}

/// Static capability record for one venue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExchangeInfo {
    pub id: ExchangeId,
    pub kind: ExchangeKind,
    /// Taker fee rate applied by the simulator, eg/ `0.001` = 10 bps.
    pub fee: f64,
    /// Settlement currency for futures venues; spot venues settle per-symbol.
    pub settlement_currency: Option<&'static str>,
    pub supported_timeframes: &'static [Timeframe],
    pub supported_leverage_modes: &'static [LeverageMode],
    pub modes: ExchangeModes,
}

use Timeframe::*;

pub const BYBIT_TIMEFRAMES: &[Timeframe] = &[
    Minute1, Minute3, Minute5, Minute15, Minute30, Hour1, Hour2, Hour4, Hour6, Hour12, Day1,
];

pub const BINANCE_TIMEFRAMES: &[Timeframe] = &[
    Minute1, Minute3, Minute5, Minute15, Minute30, Hour1, Hour2, Hour4, Hour6, Hour8, Hour12, Day1,
];

pub const COINBASE_TIMEFRAMES: &[Timeframe] = &[Minute1, Minute5, Minute15, Hour1, Hour6, Day1];

pub const APEX_TIMEFRAMES: &[Timeframe] = &[
    Minute1, Minute5, Minute15, Minute30, Hour1, Hour2, Hour4, Hour6, Hour12, Day1,
];

pub const GATE_TIMEFRAMES: &[Timeframe] = &[
    Minute1, Minute5, Minute15, Minute30, Hour1, Hour2, Hour4, Hour6, Hour8, Hour12, Day1, Week1,
];

pub const FTX_TIMEFRAMES: &[Timeframe] = &[
    Minute1, Minute3, Minute5, Minute15, Minute30, Hour1, Hour2, Hour4, Hour6, Hour12, Day1,
];

pub const BITGET_TIMEFRAMES: &[Timeframe] =
    &[Minute1, Minute5, Minute15, Minute30, Hour1, Hour4, Hour12, Day1];

pub const DYDX_TIMEFRAMES: &[Timeframe] =
    &[Minute1, Minute5, Minute15, Minute30, Hour1, Hour4, Day1];

const CROSS_ISOLATED: &[LeverageMode] = &[LeverageMode::Cross, LeverageMode::Isolated];

const BOTH_MODES: ExchangeModes = ExchangeModes {
    backtesting: true,
    live_trading: true,
};
const LIVE_ONLY: ExchangeModes = ExchangeModes {
    backtesting: false,
    live_trading: true,
};
const BACKTEST_ONLY: ExchangeModes = ExchangeModes {
    backtesting: true,
    live_trading: false,
};

/// The capability record for `id`.
pub fn exchange_info(id: ExchangeId) -> ExchangeInfo {
    let (kind, fee, settlement, timeframes, leverage, modes) = match id {
        ExchangeId::Sandbox => (
            ExchangeKind::Spot,
            0.0,
            None,
            BINANCE_TIMEFRAMES,
            &[] as &[LeverageMode],
            BACKTEST_ONLY,
        ),
        ExchangeId::CoinbaseSpot => (
            ExchangeKind::Spot,
            0.0003,
            None,
            COINBASE_TIMEFRAMES,
            &[] as &[LeverageMode],
            BOTH_MODES,
        ),
        ExchangeId::BitfinexSpot => (
            ExchangeKind::Spot,
            0.002,
            None,
            BINANCE_TIMEFRAMES,
            &[] as &[LeverageMode],
            BACKTEST_ONLY,
        ),
        ExchangeId::BinanceSpot => (
            ExchangeKind::Spot,
            0.001,
            None,
            BINANCE_TIMEFRAMES,
            &[] as &[LeverageMode],
            BOTH_MODES,
        ),
        ExchangeId::BinanceUsSpot => (
            ExchangeKind::Spot,
            0.001,
            None,
            BINANCE_TIMEFRAMES,
            &[] as &[LeverageMode],
            BOTH_MODES,
        ),
        ExchangeId::BinancePerpetualFutures => (
            ExchangeKind::Futures,
            0.0004,
            Some("USDT"),
            BINANCE_TIMEFRAMES,
            CROSS_ISOLATED,
            BOTH_MODES,
        ),
        ExchangeId::BinancePerpetualFuturesTestnet => (
            ExchangeKind::Futures,
            0.0004,
            Some("USDT"),
            BINANCE_TIMEFRAMES,
            CROSS_ISOLATED,
            LIVE_ONLY,
        ),
        ExchangeId::BybitUsdtPerpetual => (
            ExchangeKind::Futures,
            0.00055,
            Some("USDT"),
            BYBIT_TIMEFRAMES,
            CROSS_ISOLATED,
            BOTH_MODES,
        ),
        ExchangeId::BybitUsdcPerpetual => (
            ExchangeKind::Futures,
            0.00055,
            Some("USDC"),
            BYBIT_TIMEFRAMES,
            CROSS_ISOLATED,
            BOTH_MODES,
        ),
        ExchangeId::BybitUsdtPerpetualTestnet => (
            ExchangeKind::Futures,
            0.00055,
            Some("USDT"),
            BYBIT_TIMEFRAMES,
            CROSS_ISOLATED,
            LIVE_ONLY,
        ),
        ExchangeId::BybitUsdcPerpetualTestnet => (
            ExchangeKind::Futures,
            0.00055,
            Some("USDC"),
            BYBIT_TIMEFRAMES,
            CROSS_ISOLATED,
            LIVE_ONLY,
        ),
        ExchangeId::BybitSpot => (
            ExchangeKind::Spot,
            0.001,
            None,
            BYBIT_TIMEFRAMES,
            &[] as &[LeverageMode],
            BOTH_MODES,
        ),
        ExchangeId::BybitSpotTestnet => (
            ExchangeKind::Spot,
            0.001,
            None,
            BYBIT_TIMEFRAMES,
            &[] as &[LeverageMode],
            LIVE_ONLY,
        ),
        ExchangeId::FtxPerpetualFutures => (
            ExchangeKind::Futures,
            0.0006,
            Some("USD"),
            FTX_TIMEFRAMES,
            CROSS_ISOLATED,
            BACKTEST_ONLY,
        ),
        ExchangeId::FtxSpot => (
            ExchangeKind::Spot,
            0.0007,
            None,
            FTX_TIMEFRAMES,
            &[] as &[LeverageMode],
            BACKTEST_ONLY,
        ),
        ExchangeId::FtxUsSpot => (
            ExchangeKind::Spot,
            0.002,
            None,
            FTX_TIMEFRAMES,
            &[] as &[LeverageMode],
            BACKTEST_ONLY,
        ),
        ExchangeId::BitgetSpot => (
            ExchangeKind::Spot,
            0.0006,
            None,
            BITGET_TIMEFRAMES,
            &[] as &[LeverageMode],
            BOTH_MODES,
        ),
        ExchangeId::BitgetUsdtPerpetual => (
            ExchangeKind::Futures,
            0.0006,
            Some("USDT"),
            BITGET_TIMEFRAMES,
            CROSS_ISOLATED,
            BOTH_MODES,
        ),
        ExchangeId::BitgetUsdtPerpetualTestnet => (
            ExchangeKind::Futures,
            0.0006,
            Some("USDT"),
            BITGET_TIMEFRAMES,
            CROSS_ISOLATED,
            LIVE_ONLY,
        ),
        ExchangeId::DydxPerpetual => (
            ExchangeKind::Futures,
            0.0005,
            Some("USDC"),
            DYDX_TIMEFRAMES,
            CROSS_ISOLATED,
            BOTH_MODES,
        ),
        ExchangeId::DydxPerpetualTestnet => (
            ExchangeKind::Futures,
            0.0005,
            Some("USDC"),
            DYDX_TIMEFRAMES,
            CROSS_ISOLATED,
            LIVE_ONLY,
        ),
        ExchangeId::ApexProPerpetualTestnet => (
            ExchangeKind::Futures,
            0.0005,
            Some("USDC"),
            APEX_TIMEFRAMES,
            CROSS_ISOLATED,
            LIVE_ONLY,
        ),
        ExchangeId::ApexProPerpetual => (
            ExchangeKind::Futures,
            0.0005,
            Some("USDC"),
            APEX_TIMEFRAMES,
            CROSS_ISOLATED,
            BOTH_MODES,
        ),
        ExchangeId::ApexOmniPerpetualTestnet => (
            ExchangeKind::Futures,
            0.0005,
            Some("USDC"),
            APEX_TIMEFRAMES,
            CROSS_ISOLATED,
            LIVE_ONLY,
        ),
        ExchangeId::ApexOmniPerpetual => (
            ExchangeKind::Futures,
            0.0005,
            Some("USDC"),
            APEX_TIMEFRAMES,
            CROSS_ISOLATED,
            BOTH_MODES,
        ),
        ExchangeId::GateUsdtPerpetual => (
            ExchangeKind::Futures,
            0.0005,
            Some("USDT"),
            GATE_TIMEFRAMES,
            CROSS_ISOLATED,
            BOTH_MODES,
        ),
        ExchangeId::GateSpot => (
            ExchangeKind::Spot,
            0.0005,
            None,
            GATE_TIMEFRAMES,
            &[] as &[LeverageMode],
            BOTH_MODES,
        ),
    };

    ExchangeInfo {
        id,
        kind,
        fee,
        settlement_currency: settlement,
        supported_timeframes: timeframes,
        supported_leverage_modes: leverage,
        modes,
    }
}

/// Venues available for backtesting.
pub fn backtesting_exchanges() -> Vec<ExchangeId> {
    ExchangeId::all()
        .iter()
        .copied()
        .filter(|id| exchange_info(*id).modes.backtesting)
        .collect()
}

/// Venues available for live trading.
pub fn live_trading_exchanges() -> Vec<ExchangeId> {
    ExchangeId::all()
        .iter()
        .copied()
        .filter(|id| exchange_info(*id).modes.live_trading)
        .collect()
}
