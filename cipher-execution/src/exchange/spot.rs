use crate::{
    error::ExecutionError,
    exchange::{Exchange, OpenOrderRecord},
    order::Order,
};
use cipher_instrument::{
    Side,
    exchange::ExchangeId,
    money,
    order::OrderType,
    symbol::{base_asset, quote_asset},
};
use fnv::FnvHashMap;
use parking_lot::Mutex;
use smol_str::SmolStr;
use tracing::warn;
use uuid::Uuid;

/// Spot-market simulator keeping one balance per asset.
///
/// Buys reserve quote currency at submission; sells only commit base
/// currency, which is checked against the sum of every open sell. Fees come
/// out of the received side at execution.
#[derive(Debug)]
pub struct SpotExchange {
    name: ExchangeId,
    starting_balance: f64,
    fee_rate: f64,
    settlement_currency: SmolStr,
    live_mode: bool,
    state: Mutex<SpotState>,
}

#[derive(Debug, Default)]
struct SpotState {
    balances: FnvHashMap<SmolStr, f64>,
    open_orders: FnvHashMap<Uuid, OpenOrderRecord>,
}

impl SpotExchange {
    pub fn new(name: ExchangeId, starting_balance: f64, fee_rate: f64) -> Self {
        Self::with_settlement_currency(name, starting_balance, fee_rate, "USDT")
    }

    pub fn with_settlement_currency(
        name: ExchangeId,
        starting_balance: f64,
        fee_rate: f64,
        settlement_currency: &str,
    ) -> Self {
        let mut balances = FnvHashMap::default();
        balances.insert(SmolStr::new(settlement_currency), starting_balance);
        Self {
            name,
            starting_balance,
            fee_rate,
            settlement_currency: SmolStr::new(settlement_currency),
            live_mode: false,
            state: Mutex::new(SpotState {
                balances,
                open_orders: FnvHashMap::default(),
            }),
        }
    }

    pub fn live(mut self) -> Self {
        self.live_mode = true;
        self
    }

    pub fn starting_balance(&self) -> f64 {
        self.starting_balance
    }

    pub fn fee_rate(&self) -> f64 {
        self.fee_rate
    }

    pub fn settlement_currency(&self) -> &str {
        &self.settlement_currency
    }

    /// Sum of unfilled limit/stop sell quantity already committed against
    /// `base`. Market sells fill at whatever is available when they land,
    /// so they hold no commitment.
    fn committed_sell_qty(state: &SpotState, symbol: &str) -> f64 {
        state
            .open_orders
            .values()
            .filter(|record| {
                record.side == Side::Sell
                    && record.symbol == symbol
                    && record.order_type != OrderType::Market
            })
            .map(|record| record.remaining)
            .sum()
    }
}

impl Exchange for SpotExchange {
    fn name(&self) -> ExchangeId {
        self.name
    }

    fn on_order_submission(&self, order: &Order) -> Result<(), ExecutionError> {
        let mut state = self.state.lock();
        let base = base_asset(&order.symbol);
        let quote = quote_asset(&order.symbol);

        match order.side {
            Side::Buy => {
                // Market orders carry no price yet; their cost is deducted
                // once the fill price is known.
                let cost = order.qty.abs() * order.price.unwrap_or(0.0);
                let available = state.balances.get(&quote).copied().unwrap_or(0.0);
                if cost > available {
                    return Err(ExecutionError::InsufficientBalance {
                        asset: quote,
                        requested: cost,
                        available,
                    });
                }
                let balance = state.balances.entry(quote).or_insert(0.0);
                *balance = money::sub(*balance, cost);
            }
            Side::Sell => {
                let committed = Self::committed_sell_qty(&state, &order.symbol);
                let requested = committed + order.qty.abs();
                let available = state.balances.get(&base).copied().unwrap_or(0.0);
                if requested > available {
                    return Err(ExecutionError::InsufficientBalance {
                        asset: base,
                        requested,
                        available,
                    });
                }
            }
        }

        let (id, record) = OpenOrderRecord::from_order(order, 0.0);
        state.open_orders.insert(id, record);
        Ok(())
    }

    fn on_order_execution(
        &self,
        order: &Order,
        fill_qty: f64,
        fill_price: f64,
    ) -> Result<(), ExecutionError> {
        if fill_qty <= 0.0 || fill_price <= 0.0 {
            return Err(ExecutionError::InvalidParameter(format!(
                "fill must be positive: qty {fill_qty} price {fill_price}"
            )));
        }

        let mut state = self.state.lock();
        let base = base_asset(&order.symbol);
        let quote = quote_asset(&order.symbol);
        // Whether the submission reserved anything: market orders carried no
        // price, so their cost is settled here instead.
        let deferred_cost = match state.open_orders.get(&order.id) {
            Some(record) => record.order_type == OrderType::Market,
            None => order.order_type == OrderType::Market,
        };

        match order.side {
            Side::Buy => {
                if deferred_cost {
                    // Deferred market-order cost, clipped so the quote
                    // balance never goes negative.
                    let quote_balance = state.balances.entry(quote).or_insert(0.0);
                    let cost = fill_qty * fill_price;
                    if cost > *quote_balance {
                        warn!(
                            exchange = %self.name,
                            symbol = %order.symbol,
                            cost,
                            available = *quote_balance,
                            "market buy cost exceeds quote balance; clipping"
                        );
                    }
                    *quote_balance = money::sub(*quote_balance, cost.min(*quote_balance));
                }
                let received = money::mul(fill_qty, 1.0 - self.fee_rate);
                let base_balance = state.balances.entry(base).or_insert(0.0);
                *base_balance = money::add(*base_balance, received);
            }
            Side::Sell => {
                // Earlier executions may have consumed the base balance, so
                // clip the fill to what actually remains.
                let base_balance = state.balances.entry(base).or_insert(0.0);
                let actual_qty = fill_qty.min(*base_balance);
                *base_balance = money::sub(*base_balance, actual_qty);

                let proceeds = money::mul(actual_qty * fill_price, 1.0 - self.fee_rate);
                let quote_balance = state.balances.entry(quote).or_insert(0.0);
                *quote_balance = money::add(*quote_balance, proceeds);
            }
        }

        let fully_filled = state
            .open_orders
            .get_mut(&order.id)
            .map(|record| {
                record.remaining = (record.remaining - fill_qty).max(0.0);
                record.remaining == 0.0
            })
            .unwrap_or(false);
        if fully_filled {
            state.open_orders.remove(&order.id);
        }
        Ok(())
    }

    fn on_order_cancellation(&self, order: &Order) -> Result<(), ExecutionError> {
        let mut state = self.state.lock();
        let Some(record) = state.open_orders.remove(&order.id) else {
            return Ok(());
        };

        if record.side == Side::Buy {
            // Restore the unfilled part of the reservation. Sell commitments
            // were never deducted, so there is nothing to restore.
            let refund = record.remaining * record.price.unwrap_or(0.0);
            let quote = quote_asset(&order.symbol);
            let balance = state.balances.entry(quote).or_insert(0.0);
            *balance = money::add(*balance, refund);
        }
        Ok(())
    }

    fn asset(&self, asset: &str) -> f64 {
        self.state
            .lock()
            .balances
            .get(asset)
            .copied()
            .unwrap_or(0.0)
    }

    fn set_asset(&self, asset: &str, amount: f64) {
        self.state.lock().balances.insert(SmolStr::new(asset), amount);
    }

    fn wallet_balance(&self) -> f64 {
        self.asset(&self.settlement_currency)
    }

    fn available_margin(&self) -> f64 {
        self.wallet_balance()
    }

    fn update_balance_from_stream(&self, asset: &str, amount: f64) -> Result<(), ExecutionError> {
        if !self.live_mode {
            return Err(ExecutionError::NotLiveTrading);
        }
        self.set_asset(asset, amount);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::builder::OrderBuilder;
    use cipher_instrument::order::OrderType;

    fn exchange() -> SpotExchange {
        SpotExchange::new(ExchangeId::BinanceSpot, 10_000.0, 0.001)
    }

    fn limit(side: Side, qty: f64, price: f64) -> Order {
        OrderBuilder::new(ExchangeId::BinanceSpot, "BTC-USDT", side, OrderType::Limit)
            .qty(qty)
            .price(price)
            .build(0)
            .unwrap()
    }

    #[test]
    fn basic_properties() {
        let exchange = exchange();
        assert_eq!(exchange.name(), ExchangeId::BinanceSpot);
        assert_eq!(exchange.starting_balance(), 10_000.0);
        assert_eq!(exchange.fee_rate(), 0.001);
        assert_eq!(exchange.settlement_currency(), "USDT");
        assert_eq!(exchange.wallet_balance(), 10_000.0);
        assert_eq!(exchange.available_margin(), 10_000.0);
    }

    #[test]
    fn asset_management() {
        let exchange = exchange();
        assert_eq!(exchange.asset("USDT"), 10_000.0);
        assert_eq!(exchange.asset("BTC"), 0.0);
        exchange.set_asset("BTC", 2.5);
        assert_eq!(exchange.asset("BTC"), 2.5);
        exchange.set_asset("BTC", 0.0);
        assert_eq!(exchange.asset("BTC"), 0.0);
    }

    #[test]
    fn buy_submission_reserves_quote() {
        let exchange = exchange();
        let order = limit(Side::Buy, 1.0, 5_000.0);
        exchange.on_order_submission(&order).unwrap();
        assert_eq!(exchange.asset("USDT"), 5_000.0);
        assert_eq!(exchange.asset("BTC"), 0.0);
    }

    #[test]
    fn buy_execution_credits_base_minus_fee() {
        let exchange = exchange();
        let mut order = limit(Side::Buy, 1.0, 5_000.0);
        exchange.on_order_submission(&order).unwrap();
        order.execute(1).unwrap();
        exchange.on_order_execution(&order, 1.0, 5_000.0).unwrap();

        assert_eq!(exchange.asset("USDT"), 5_000.0);
        assert_eq!(exchange.asset("BTC"), 0.999);
    }

    #[test]
    fn insufficient_quote_fails_before_any_mutation() {
        let exchange = exchange();
        let order = limit(Side::Buy, 3.0, 5_000.0);
        assert!(matches!(
            exchange.on_order_submission(&order),
            Err(ExecutionError::InsufficientBalance { .. })
        ));
        assert_eq!(exchange.asset("USDT"), 10_000.0);
    }

    #[test]
    fn sell_over_commitment_fails() {
        let exchange = exchange();
        exchange.set_asset("BTC", 2.0);

        exchange
            .on_order_submission(&limit(Side::Sell, 1.0, 5_000.0))
            .unwrap();
        exchange
            .on_order_submission(&limit(Side::Sell, 1.0, 5_100.0))
            .unwrap();
        // Third sell would commit 2.1 BTC against 2.0 held.
        assert!(matches!(
            exchange.on_order_submission(&limit(Side::Sell, 0.1, 5_200.0)),
            Err(ExecutionError::InsufficientBalance { .. })
        ));
        assert_eq!(exchange.asset("BTC"), 2.0);
    }

    #[test]
    fn market_sells_hold_no_commitment() {
        let exchange = exchange();
        exchange.set_asset("BTC", 2.0);

        let market = OrderBuilder::new(
            ExchangeId::BinanceSpot,
            "BTC-USDT",
            Side::Sell,
            OrderType::Market,
        )
        .qty(1.5)
        .build(0)
        .unwrap();
        exchange.on_order_submission(&market).unwrap();

        // The unfilled market sell is not committed, so a limit sell for the
        // whole balance still passes.
        exchange
            .on_order_submission(&limit(Side::Sell, 2.0, 5_000.0))
            .unwrap();

        // Limit commitments still accumulate against each other.
        assert!(matches!(
            exchange.on_order_submission(&limit(Side::Sell, 0.5, 5_100.0)),
            Err(ExecutionError::InsufficientBalance { .. })
        ));
    }

    #[test]
    fn sell_execution_clips_to_remaining_base() {
        let exchange = exchange();
        exchange.set_asset("BTC", 0.5);

        let mut order = limit(Side::Sell, 0.5, 5_000.0);
        exchange.on_order_submission(&order).unwrap();
        // Balance eroded after submission (eg/ another order executed).
        exchange.set_asset("BTC", 0.3);

        order.execute(1).unwrap();
        exchange.on_order_execution(&order, 0.5, 5_000.0).unwrap();

        assert_eq!(exchange.asset("BTC"), 0.0);
        // Proceeds only for the 0.3 actually available.
        assert_eq!(exchange.asset("USDT"), 10_000.0 + 0.3 * 5_000.0 * 0.999);
    }

    #[test]
    fn buy_cancellation_restores_quote() {
        let exchange = exchange();
        let mut order = limit(Side::Buy, 1.0, 5_000.0);
        exchange.on_order_submission(&order).unwrap();
        assert_eq!(exchange.asset("USDT"), 5_000.0);

        order.cancel(1, crate::order::CancelSource::Strategy).unwrap();
        exchange.on_order_cancellation(&order).unwrap();
        assert_eq!(exchange.asset("USDT"), 10_000.0);
    }

    #[test]
    fn partial_fill_then_cancel_refunds_remainder() {
        let exchange = exchange();
        let mut order = limit(Side::Buy, 2.0, 1_000.0);
        exchange.on_order_submission(&order).unwrap();
        assert_eq!(exchange.asset("USDT"), 8_000.0);

        order.execute_partially(1, 0.5).unwrap();
        exchange.on_order_execution(&order, 0.5, 1_000.0).unwrap();
        assert_eq!(exchange.asset("BTC"), 0.5 * 0.999);

        order.cancel(2, crate::order::CancelSource::Strategy).unwrap();
        exchange.on_order_cancellation(&order).unwrap();
        // 1.5 unfilled * 1000 refunded.
        assert_eq!(exchange.asset("USDT"), 9_500.0);
    }

    #[test]
    fn market_buy_defers_cost_to_execution() {
        let exchange = exchange();
        let mut order =
            OrderBuilder::new(ExchangeId::BinanceSpot, "BTC-USDT", Side::Buy, OrderType::Market)
                .qty(1.0)
                .build(0)
                .unwrap();
        exchange.on_order_submission(&order).unwrap();
        // Nothing reserved while the price is unknown.
        assert_eq!(exchange.asset("USDT"), 10_000.0);

        order.execute(1).unwrap();
        exchange.on_order_execution(&order, 1.0, 6_000.0).unwrap();
        assert_eq!(exchange.asset("USDT"), 4_000.0);
        assert_eq!(exchange.asset("BTC"), 0.999);
    }

    #[test]
    fn sell_cancellation_is_a_balance_noop() {
        let exchange = exchange();
        exchange.set_asset("BTC", 2.0);
        let mut order = limit(Side::Sell, 1.0, 5_000.0);
        exchange.on_order_submission(&order).unwrap();
        order.cancel(1, crate::order::CancelSource::Strategy).unwrap();
        exchange.on_order_cancellation(&order).unwrap();
        assert_eq!(exchange.asset("BTC"), 2.0);
        assert_eq!(exchange.asset("USDT"), 10_000.0);

        // The commitment was released: selling 2.0 now succeeds.
        assert!(
            exchange
                .on_order_submission(&limit(Side::Sell, 2.0, 5_000.0))
                .is_ok()
        );
    }

    #[test]
    fn stream_updates_require_live_mode() {
        let exchange = exchange();
        assert!(matches!(
            exchange.update_balance_from_stream("USDT", 1.0),
            Err(ExecutionError::NotLiveTrading)
        ));

        let live = SpotExchange::new(ExchangeId::BinanceSpot, 0.0, 0.001).live();
        live.update_balance_from_stream("USDT", 123.0).unwrap();
        assert_eq!(live.asset("USDT"), 123.0);
    }
}
