use crate::{
    error::ExecutionError,
    order::{Order, prepare_qty},
};
use cipher_instrument::{
    Side,
    exchange::ExchangeId,
    order::{OrderStatus, OrderSubmittedVia, OrderType},
};
use serde_json::Value;
use uuid::Uuid;

/// Builder validating an [`Order`] before it exists.
///
/// External order payloads (adapter JSON, strategy calls) funnel through
/// here so that a constructed `Order` always satisfies its invariants:
/// non-zero quantity, a price whenever the type demands one, side-signed
/// `qty`.
#[derive(Debug, Clone)]
pub struct OrderBuilder {
    exchange: ExchangeId,
    symbol: String,
    side: Side,
    order_type: OrderType,
    qty: f64,
    price: Option<f64>,
    reduce_only: bool,
    session_id: Option<Uuid>,
    trade_id: Option<Uuid>,
    submitted_via: Option<OrderSubmittedVia>,
    vars: Value,
}

impl OrderBuilder {
    pub fn new(exchange: ExchangeId, symbol: &str, side: Side, order_type: OrderType) -> Self {
        Self {
            exchange,
            symbol: symbol.to_string(),
            side,
            order_type,
            qty: 0.0,
            price: None,
            reduce_only: false,
            session_id: None,
            trade_id: None,
            submitted_via: None,
            vars: Value::Null,
        }
    }

    pub fn qty(mut self, qty: f64) -> Self {
        self.qty = qty;
        self
    }

    pub fn price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn reduce_only(mut self, reduce_only: bool) -> Self {
        self.reduce_only = reduce_only;
        self
    }

    pub fn session_id(mut self, session_id: Uuid) -> Self {
        self.session_id = Some(session_id);
        self
    }

    pub fn trade_id(mut self, trade_id: Uuid) -> Self {
        self.trade_id = Some(trade_id);
        self
    }

    pub fn submitted_via(mut self, via: OrderSubmittedVia) -> Self {
        self.submitted_via = Some(via);
        self
    }

    pub fn vars(mut self, vars: Value) -> Self {
        self.vars = vars;
        self
    }

    /// Validate and construct, stamping `created_at` with the engine clock.
    pub fn build(self, now: i64) -> Result<Order, ExecutionError> {
        if self.qty == 0.0 || !self.qty.is_finite() {
            return Err(ExecutionError::InvalidParameter(format!(
                "order quantity must be a non-zero finite number: {}",
                self.qty
            )));
        }
        match self.price {
            None if self.order_type.requires_price() => {
                return Err(ExecutionError::InvalidParameter(format!(
                    "{} orders require a price",
                    self.order_type
                )));
            }
            Some(price) if !(price.is_finite() && price > 0.0) => {
                return Err(ExecutionError::InvalidParameter(format!(
                    "order price must be a positive finite number: {price}"
                )));
            }
            _ => {}
        }

        Ok(Order {
            id: Uuid::new_v4(),
            trade_id: self.trade_id,
            session_id: self.session_id,
            exchange_id: None,
            symbol: self.symbol,
            exchange: self.exchange,
            side: self.side,
            order_type: self.order_type,
            reduce_only: self.reduce_only,
            qty: prepare_qty(self.qty, self.side),
            filled_qty: 0.0,
            price: self.price,
            status: OrderStatus::Active,
            created_at: now,
            executed_at: None,
            canceled_at: None,
            vars: self.vars,
            submitted_via: self.submitted_via,
        })
    }
}
