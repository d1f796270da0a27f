use serde::{Deserialize, Serialize};

/// Process-wide run mode.
///
/// Gates the time source (wall clock vs frozen candle time), whether
/// notifications fire, and whether saves persist.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum TradingMode {
    #[default]
    Backtest,
    Livetrade,
    Papertrade,
    /// Importing historical candles.
    Candles,
    Optimize,
}

impl TradingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradingMode::Backtest => "backtest",
            TradingMode::Livetrade => "livetrade",
            TradingMode::Papertrade => "papertrade",
            TradingMode::Candles => "candles",
            TradingMode::Optimize => "optimize",
        }
    }

    pub fn is_backtesting(&self) -> bool {
        matches!(self, TradingMode::Backtest | TradingMode::Optimize)
    }

    /// Live against a venue, with real or paper money.
    pub fn is_live(&self) -> bool {
        matches!(self, TradingMode::Livetrade | TradingMode::Papertrade)
    }

    pub fn is_live_trading(&self) -> bool {
        *self == TradingMode::Livetrade
    }

    pub fn is_paper_trading(&self) -> bool {
        *self == TradingMode::Papertrade
    }

    pub fn is_optimizing(&self) -> bool {
        *self == TradingMode::Optimize
    }

    pub fn is_importing_candles(&self) -> bool {
        *self == TradingMode::Candles
    }

    /// Suppress output-producing side effects.
    pub fn should_execute_silently(&self, is_unit_testing: bool) -> bool {
        self.is_optimizing() || is_unit_testing
    }
}

impl std::fmt::Display for TradingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TradingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "backtest" => Ok(TradingMode::Backtest),
            "livetrade" => Ok(TradingMode::Livetrade),
            "papertrade" => Ok(TradingMode::Papertrade),
            "candles" => Ok(TradingMode::Candles),
            "optimize" => Ok(TradingMode::Optimize),
            other => Err(format!("invalid trading mode: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicates() {
        assert!(TradingMode::Backtest.is_backtesting());
        assert!(TradingMode::Optimize.is_backtesting());
        assert!(!TradingMode::Livetrade.is_backtesting());

        assert!(TradingMode::Livetrade.is_live());
        assert!(TradingMode::Papertrade.is_live());
        assert!(!TradingMode::Backtest.is_live());

        assert!(TradingMode::Livetrade.is_live_trading());
        assert!(!TradingMode::Papertrade.is_live_trading());
        assert!(TradingMode::Papertrade.is_paper_trading());
        assert!(TradingMode::Candles.is_importing_candles());
    }

    #[test]
    fn silent_execution() {
        assert!(TradingMode::Optimize.should_execute_silently(false));
        assert!(TradingMode::Backtest.should_execute_silently(true));
        assert!(!TradingMode::Backtest.should_execute_silently(false));
    }

    #[test]
    fn string_round_trip() {
        for mode in [
            TradingMode::Backtest,
            TradingMode::Livetrade,
            TradingMode::Papertrade,
            TradingMode::Candles,
            TradingMode::Optimize,
        ] {
            assert_eq!(mode.as_str().parse::<TradingMode>().unwrap(), mode);
        }
        assert!("turbo".parse::<TradingMode>().is_err());
    }
}
