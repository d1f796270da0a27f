use crate::error::ExecutionError;
use cipher_instrument::{
    Side,
    exchange::ExchangeId,
    order::{OrderStatus, OrderSubmittedVia, OrderType},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

/// Typed construction of [`Order`] values.
pub mod builder;

/// Who asked for a cancellation.
///
/// Late cancel events replayed by an exchange stream must not touch orders
/// that were never transmitted, so stream cancels of queued orders no-op.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CancelSource {
    Strategy,
    Stream,
}

/// Give `qty` the sign convention of `side`: buys positive, sells negative.
pub fn prepare_qty(qty: f64, side: Side) -> f64 {
    qty.abs() * side.sign()
}

/// A single order through its whole lifecycle.
///
/// `qty` carries the side's sign convention; `filled_qty` is always a
/// magnitude, `0 <= filled_qty <= qty.abs()`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Order {
    pub id: Uuid,
    pub trade_id: Option<Uuid>,
    pub session_id: Option<Uuid>,
    /// Identifier assigned by the venue once transmitted.
    pub exchange_id: Option<String>,
    pub symbol: String,
    pub exchange: ExchangeId,
    pub side: Side,
    pub order_type: OrderType,
    pub reduce_only: bool,
    pub qty: f64,
    pub filled_qty: f64,
    pub price: Option<f64>,
    pub status: OrderStatus,
    pub created_at: i64,
    pub executed_at: Option<i64>,
    pub canceled_at: Option<i64>,
    /// Free-form strategy state attached to the order.
    pub vars: Value,
    pub submitted_via: Option<OrderSubmittedVia>,
}

impl Order {
    pub fn is_active(&self) -> bool {
        self.status == OrderStatus::Active
    }

    pub fn is_queued(&self) -> bool {
        self.status == OrderStatus::Queued
    }

    pub fn is_canceled(&self) -> bool {
        self.status == OrderStatus::Canceled
    }

    pub fn is_executed(&self) -> bool {
        self.status == OrderStatus::Executed
    }

    pub fn is_partially_filled(&self) -> bool {
        self.status == OrderStatus::PartiallyFilled
    }

    /// A new order has not transacted anything yet.
    pub fn is_new(&self) -> bool {
        matches!(self.status, OrderStatus::Active | OrderStatus::Queued) && self.filled_qty == 0.0
    }

    pub fn is_filled(&self) -> bool {
        self.filled_qty >= self.qty.abs()
    }

    /// Notional value; zero until a price is known.
    pub fn value(&self) -> f64 {
        self.qty.abs() * self.price.unwrap_or(0.0)
    }

    /// Unfilled magnitude signed by side.
    pub fn remaining_qty(&self) -> f64 {
        (self.qty.abs() - self.filled_qty) * self.side.sign()
    }

    /// Move a not-yet-fundable order (back) onto the local queue.
    ///
    /// Clears any previous cancellation so a re-queued order looks fresh.
    pub fn queue_it(&mut self) -> Result<(), ExecutionError> {
        match self.status {
            OrderStatus::Active | OrderStatus::Queued | OrderStatus::Canceled => {
                self.canceled_at = None;
                self.status = OrderStatus::Queued;
                debug!(order_id = %self.id, symbol = %self.symbol, "order queued");
                Ok(())
            }
            from => Err(ExecutionError::InvalidTransition {
                from,
                to: OrderStatus::Queued,
            }),
        }
    }

    /// Transmit a queued order, regenerating its id so the venue does not
    /// reject it as a replay.
    pub fn resubmit(&mut self) -> Result<(), ExecutionError> {
        if self.status != OrderStatus::Queued {
            return Err(ExecutionError::InvalidTransition {
                from: self.status,
                to: OrderStatus::Active,
            });
        }
        self.id = Uuid::new_v4();
        self.status = OrderStatus::Active;
        debug!(order_id = %self.id, symbol = %self.symbol, "order resubmitted");
        Ok(())
    }

    /// Cancel the order.
    ///
    /// Terminal orders refuse; a stream cancel against a queued order is a
    /// no-op because the venue never saw it.
    pub fn cancel(&mut self, now: i64, source: CancelSource) -> Result<(), ExecutionError> {
        match self.status {
            OrderStatus::Canceled
            | OrderStatus::Executed
            | OrderStatus::Rejected
            | OrderStatus::Liquidated => Err(ExecutionError::InvalidTransition {
                from: self.status,
                to: OrderStatus::Canceled,
            }),
            OrderStatus::Queued if source == CancelSource::Stream => Ok(()),
            _ => {
                self.canceled_at = Some(now);
                self.status = OrderStatus::Canceled;
                debug!(order_id = %self.id, symbol = %self.symbol, "order canceled");
                Ok(())
            }
        }
    }

    /// Fill the order completely.
    pub fn execute(&mut self, now: i64) -> Result<(), ExecutionError> {
        match self.status {
            OrderStatus::Active | OrderStatus::PartiallyFilled => {
                self.filled_qty = self.qty.abs();
                self.executed_at = Some(now);
                self.status = OrderStatus::Executed;
                debug!(order_id = %self.id, symbol = %self.symbol, "order executed");
                Ok(())
            }
            from => Err(ExecutionError::InvalidTransition {
                from,
                to: OrderStatus::Executed,
            }),
        }
    }

    /// Fill `fill_qty` (a magnitude) of the order.
    ///
    /// A fill that completes the order is equivalent to [`Order::execute`].
    pub fn execute_partially(&mut self, now: i64, fill_qty: f64) -> Result<(), ExecutionError> {
        if fill_qty <= 0.0 {
            return Err(ExecutionError::InvalidParameter(format!(
                "fill quantity must be positive: {fill_qty}"
            )));
        }
        match self.status {
            OrderStatus::Active | OrderStatus::PartiallyFilled => {
                let filled = self.filled_qty + fill_qty;
                if filled > self.qty.abs() + f64::EPSILON {
                    return Err(ExecutionError::InvalidParameter(format!(
                        "fill {fill_qty} exceeds remaining {}",
                        self.remaining_qty().abs()
                    )));
                }
                self.filled_qty = filled.min(self.qty.abs());
                self.executed_at = Some(now);
                self.status = if self.is_filled() {
                    OrderStatus::Executed
                } else {
                    OrderStatus::PartiallyFilled
                };
                debug!(
                    order_id = %self.id,
                    symbol = %self.symbol,
                    fill_qty,
                    filled_qty = self.filled_qty,
                    "order filled"
                );
                Ok(())
            }
            from => Err(ExecutionError::InvalidTransition {
                from,
                to: OrderStatus::PartiallyFilled,
            }),
        }
    }

    /// Terminal rejection reported by the venue.
    pub fn reject(&mut self) -> Result<(), ExecutionError> {
        if self.status.is_terminal() {
            return Err(ExecutionError::InvalidTransition {
                from: self.status,
                to: OrderStatus::Rejected,
            });
        }
        self.status = OrderStatus::Rejected;
        Ok(())
    }

    /// Terminal liquidation reported by the venue.
    pub fn liquidate(&mut self) -> Result<(), ExecutionError> {
        if self.status.is_terminal() {
            return Err(ExecutionError::InvalidTransition {
                from: self.status,
                to: OrderStatus::Liquidated,
            });
        }
        self.status = OrderStatus::Liquidated;
        Ok(())
    }
}
