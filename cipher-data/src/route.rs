use crate::error::DataError;
use cipher_instrument::{exchange::ExchangeId, timeframe::Timeframe};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Binds one (exchange, symbol, timeframe) tuple to a strategy.
///
/// Data-only routes omit the timeframe and strategy; they exist so the
/// market-data state warms up symbols a strategy reads but does not trade.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize, Serialize)]
pub struct Route {
    pub exchange: ExchangeId,
    pub symbol: String,
    pub timeframe: Option<Timeframe>,
    pub strategy_name: Option<String>,
    pub dna: Option<String>,
}

impl Route {
    pub fn new(exchange: ExchangeId, symbol: &str, timeframe: Option<Timeframe>) -> Self {
        Self {
            exchange,
            symbol: symbol.to_string(),
            timeframe,
            strategy_name: None,
            dna: None,
        }
    }

    pub fn with_strategy(mut self, strategy_name: &str) -> Self {
        self.strategy_name = Some(strategy_name.to_string());
        self
    }

    pub fn with_dna(mut self, dna: &str) -> Self {
        self.dna = Some(dna.to_string());
        self
    }

    fn formatted(&self) -> Value {
        json!({
            "exchange": self.exchange,
            "symbol": self.symbol,
            "timeframe": self.timeframe,
            "strategy_name": self.strategy_name,
        })
    }
}

/// Ordered registry of trading routes plus data-only routes.
///
/// Set once per run; `reset` clears everything for the next run.
#[derive(Debug, Default)]
pub struct Router {
    routes: Vec<Route>,
    data_routes: Vec<Route>,
    initiated: bool,
}

impl Router {
    /// Install the run's routes. Fails if routes were already set.
    pub fn init(&mut self, routes: Vec<Route>, data_routes: Vec<Route>) -> Result<(), DataError> {
        if self.initiated {
            return Err(DataError::RoutesAlreadySet);
        }
        self.routes = routes;
        self.data_routes = data_routes;
        self.initiated = true;
        Ok(())
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn data_routes(&self) -> &[Route] {
        &self.data_routes
    }

    /// Trading routes followed by data-only routes.
    pub fn all_routes(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter().chain(self.data_routes.iter())
    }

    pub fn get(&self, index: usize) -> Option<&Route> {
        self.routes.get(index)
    }

    pub fn formatted_routes(&self) -> Vec<Value> {
        self.routes.iter().map(Route::formatted).collect()
    }

    pub fn formatted_data_routes(&self) -> Vec<Value> {
        self.data_routes.iter().map(Route::formatted).collect()
    }

    pub fn all_formatted_routes(&self) -> Vec<Value> {
        self.all_routes().map(Route::formatted).collect()
    }

    /// Clear every route so a new run can call [`Router::init`] again.
    pub fn reset(&mut self) {
        self.routes.clear();
        self.data_routes.clear();
        self.initiated = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn btc_route() -> Route {
        Route::new(ExchangeId::BinanceSpot, "BTC-USDT", Some(Timeframe::Hour1))
            .with_strategy("trend_follower")
    }

    #[test]
    fn init_is_set_once() {
        let mut router = Router::default();
        router.init(vec![btc_route()], vec![]).unwrap();
        assert_eq!(router.routes().len(), 1);
        assert!(matches!(
            router.init(vec![], vec![]),
            Err(DataError::RoutesAlreadySet)
        ));
    }

    #[test]
    fn reset_allows_reinit() {
        let mut router = Router::default();
        router.init(vec![btc_route()], vec![]).unwrap();
        router.reset();
        assert!(router.routes().is_empty());
        assert!(router.init(vec![btc_route()], vec![]).is_ok());
    }

    #[test]
    fn all_routes_orders_trading_first() {
        let mut router = Router::default();
        router
            .init(
                vec![btc_route()],
                vec![Route::new(ExchangeId::BinanceSpot, "ETH-USDT", None)],
            )
            .unwrap();
        let symbols: Vec<_> = router.all_routes().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["BTC-USDT", "ETH-USDT"]);
    }

    #[test]
    fn formatted_routes_expose_strategy() {
        let mut router = Router::default();
        router.init(vec![btc_route()], vec![]).unwrap();
        let formatted = router.formatted_routes();
        assert_eq!(formatted[0]["strategy_name"], "trend_follower");
        assert_eq!(formatted[0]["exchange"], "binance_spot");
    }
}
