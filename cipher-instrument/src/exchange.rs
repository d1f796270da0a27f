use crate::error::InstrumentError;
use serde::{Deserialize, Serialize};

/// Unique identifier for a trading venue.
///
/// ### Notes
/// A venue may have distinct spot and derivative markets with separate APIs,
/// so each market is represented as its own variant (eg/ `BybitSpot` and
/// `BybitUsdtPerpetual`).
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ExchangeId {
    Sandbox,
    CoinbaseSpot,
    BitfinexSpot,
    BinanceSpot,
    BinanceUsSpot,
    BinancePerpetualFutures,
    BinancePerpetualFuturesTestnet,
    BybitUsdtPerpetual,
    BybitUsdcPerpetual,
    BybitUsdtPerpetualTestnet,
    BybitUsdcPerpetualTestnet,
    BybitSpot,
    BybitSpotTestnet,
    FtxPerpetualFutures,
    FtxSpot,
    FtxUsSpot,
    BitgetSpot,
    BitgetUsdtPerpetual,
    BitgetUsdtPerpetualTestnet,
    DydxPerpetual,
    DydxPerpetualTestnet,
    ApexProPerpetualTestnet,
    ApexProPerpetual,
    ApexOmniPerpetualTestnet,
    ApexOmniPerpetual,
    GateUsdtPerpetual,
    GateSpot,
}

impl ExchangeId {
    /// Return the &str representation of this [`ExchangeId`].
    pub fn as_str(&self) -> &'static str {
        match self {
            ExchangeId::Sandbox => "sandbox",
            ExchangeId::CoinbaseSpot => "coinbase_spot",
            ExchangeId::BitfinexSpot => "bitfinex_spot",
            ExchangeId::BinanceSpot => "binance_spot",
            ExchangeId::BinanceUsSpot => "binance_us_spot",
            ExchangeId::BinancePerpetualFutures => "binance_perpetual_futures",
            ExchangeId::BinancePerpetualFuturesTestnet => "binance_perpetual_futures_testnet",
            ExchangeId::BybitUsdtPerpetual => "bybit_usdt_perpetual",
            ExchangeId::BybitUsdcPerpetual => "bybit_usdc_perpetual",
            ExchangeId::BybitUsdtPerpetualTestnet => "bybit_usdt_perpetual_testnet",
            ExchangeId::BybitUsdcPerpetualTestnet => "bybit_usdc_perpetual_testnet",
            ExchangeId::BybitSpot => "bybit_spot",
            ExchangeId::BybitSpotTestnet => "bybit_spot_testnet",
            ExchangeId::FtxPerpetualFutures => "ftx_perpetual_futures",
            ExchangeId::FtxSpot => "ftx_spot",
            ExchangeId::FtxUsSpot => "ftx_us_spot",
            ExchangeId::BitgetSpot => "bitget_spot",
            ExchangeId::BitgetUsdtPerpetual => "bitget_usdt_perpetual",
            ExchangeId::BitgetUsdtPerpetualTestnet => "bitget_usdt_perpetual_testnet",
            ExchangeId::DydxPerpetual => "dydx_perpetual",
            ExchangeId::DydxPerpetualTestnet => "dydx_perpetual_testnet",
            ExchangeId::ApexProPerpetualTestnet => "apex_pro_perpetual_testnet",
            ExchangeId::ApexProPerpetual => "apex_pro_perpetual",
            ExchangeId::ApexOmniPerpetualTestnet => "apex_omni_perpetual_testnet",
            ExchangeId::ApexOmniPerpetual => "apex_omni_perpetual",
            ExchangeId::GateUsdtPerpetual => "gate_usdt_perpetual",
            ExchangeId::GateSpot => "gate_spot",
        }
    }

    /// Every variant, in catalog order.
    pub fn all() -> &'static [ExchangeId] {
        use ExchangeId::*;
        &[
            Sandbox,
            CoinbaseSpot,
            BitfinexSpot,
            BinanceSpot,
            BinanceUsSpot,
            BinancePerpetualFutures,
            BinancePerpetualFuturesTestnet,
            BybitUsdtPerpetual,
            BybitUsdcPerpetual,
            BybitUsdtPerpetualTestnet,
            BybitUsdcPerpetualTestnet,
            BybitSpot,
            BybitSpotTestnet,
            FtxPerpetualFutures,
            FtxSpot,
            FtxUsSpot,
            BitgetSpot,
            BitgetUsdtPerpetual,
            BitgetUsdtPerpetualTestnet,
            DydxPerpetual,
            DydxPerpetualTestnet,
            ApexProPerpetualTestnet,
            ApexProPerpetual,
            ApexOmniPerpetualTestnet,
            ApexOmniPerpetual,
            GateUsdtPerpetual,
            GateSpot,
        ]
    }
}

impl std::fmt::Display for ExchangeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ExchangeId {
    type Err = InstrumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExchangeId::all()
            .iter()
            .find(|id| id.as_str() == s)
            .copied()
            .ok_or_else(|| InstrumentError::InvalidExchange(s.to_string()))
    }
}

/// Market kind a venue serves.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ExchangeKind {
    Spot,
    Futures,
}

impl ExchangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExchangeKind::Spot => "spot",
            ExchangeKind::Futures => "futures",
        }
    }
}

impl std::fmt::Display for ExchangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
