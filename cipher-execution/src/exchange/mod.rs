use crate::{error::ExecutionError, order::Order};
use cipher_instrument::{Side, exchange::ExchangeId, order::OrderType};
use uuid::Uuid;

/// Futures-margin simulator.
pub mod futures;

/// Spot-balance simulator.
pub mod spot;

pub use futures::FuturesExchange;
pub use spot::SpotExchange;

/// Contract shared by the exchange simulators.
///
/// Implementations hold one lock per exchange instance for the whole
/// duration of a call, so `sum(balances) + reserved` stays consistent across
/// the submission / execution / cancellation sequence of every order.
pub trait Exchange: Send + Sync {
    fn name(&self) -> ExchangeId;

    /// Funds check and reservation. Must fail before any state is touched.
    fn on_order_submission(&self, order: &Order) -> Result<(), ExecutionError>;

    /// Apply a fill of `fill_qty` (a magnitude) at `fill_price`.
    fn on_order_execution(
        &self,
        order: &Order,
        fill_qty: f64,
        fill_price: f64,
    ) -> Result<(), ExecutionError>;

    /// Release whatever the submission reserved for the unfilled remainder.
    fn on_order_cancellation(&self, order: &Order) -> Result<(), ExecutionError>;

    /// Current balance of `asset`; unknown assets read as zero.
    fn asset(&self, asset: &str) -> f64;

    fn set_asset(&self, asset: &str, amount: f64);

    /// Balance in the settlement currency.
    fn wallet_balance(&self) -> f64;

    fn available_margin(&self) -> f64;

    /// Balance push from a live account stream.
    fn update_balance_from_stream(&self, asset: &str, amount: f64) -> Result<(), ExecutionError>;
}

/// What a simulator remembers about an outstanding order.
#[derive(Debug, Clone)]
pub(crate) struct OpenOrderRecord {
    pub symbol: String,
    pub side: Side,
    pub order_type: OrderType,
    /// Unfilled magnitude.
    pub remaining: f64,
    /// Submission price; `None` until a market order fills.
    pub price: Option<f64>,
    /// Margin held for this order (futures only).
    pub reserved_margin: f64,
}

impl OpenOrderRecord {
    pub fn from_order(order: &Order, reserved_margin: f64) -> (Uuid, Self) {
        (
            order.id,
            Self {
                symbol: order.symbol.clone(),
                side: order.side,
                order_type: order.order_type,
                remaining: order.remaining_qty().abs(),
                price: order.price,
                reserved_margin,
            },
        )
    }
}
