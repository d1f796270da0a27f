use crate::{
    error::ExecutionError,
    exchange::{Exchange, OpenOrderRecord},
    order::Order,
    pnl::{estimate_average_price, estimate_pnl},
};
use cipher_instrument::{Side, exchange::ExchangeId, money, side_to_type};
use fnv::FnvHashMap;
use parking_lot::Mutex;
use smol_str::SmolStr;
use tracing::debug;
use uuid::Uuid;

/// Net position carried per symbol: quantity signed by direction.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Position {
    pub qty: f64,
    pub entry_price: f64,
}

/// Futures simulator: one wallet in the settlement currency plus reserved
/// margin per outstanding order.
///
/// Submission reserves `qty * price / leverage`; fills release the
/// reservation proportionally, charge fees, and realize PNL whenever they
/// reduce the net position.
#[derive(Debug)]
pub struct FuturesExchange {
    name: ExchangeId,
    starting_balance: f64,
    fee_rate: f64,
    settlement_currency: SmolStr,
    leverage: f64,
    live_mode: bool,
    state: Mutex<FuturesState>,
}

#[derive(Debug, Default)]
struct FuturesState {
    wallet_balance: f64,
    reserved_margin: f64,
    open_orders: FnvHashMap<Uuid, OpenOrderRecord>,
    positions: FnvHashMap<String, Position>,
}

impl FuturesExchange {
    pub fn new(
        name: ExchangeId,
        starting_balance: f64,
        fee_rate: f64,
        settlement_currency: &str,
        leverage: f64,
    ) -> Self {
        Self {
            name,
            starting_balance,
            fee_rate,
            settlement_currency: SmolStr::new(settlement_currency),
            leverage: leverage.max(1.0),
            live_mode: false,
            state: Mutex::new(FuturesState {
                wallet_balance: starting_balance,
                ..FuturesState::default()
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

    pub fn leverage(&self) -> f64 {
        self.leverage
    }

    /// Net position for `symbol`; flat markets read as default.
    pub fn position(&self, symbol: &str) -> Position {
        self.state
            .lock()
            .positions
            .get(symbol)
            .copied()
            .unwrap_or_default()
    }

    pub fn reserved_margin(&self) -> f64 {
        self.state.lock().reserved_margin
    }

    /// Credit (or debit) realized PNL directly, eg/ funding payments.
    pub fn add_realized_pnl(&self, amount: f64) {
        let mut state = self.state.lock();
        state.wallet_balance = money::add(state.wallet_balance, amount);
    }

    /// Fold a signed fill into the symbol's net position, returning the PNL
    /// realized by any reduction.
    fn apply_fill_to_position(
        position: &mut Position,
        signed_fill: f64,
        fill_price: f64,
    ) -> Result<f64, ExecutionError> {
        if position.qty == 0.0 || position.qty.signum() == signed_fill.signum() {
            position.entry_price = estimate_average_price(
                signed_fill,
                fill_price,
                position.qty,
                position.entry_price,
            )?;
            position.qty += signed_fill;
            return Ok(0.0);
        }

        let closed_qty = position.qty.abs().min(signed_fill.abs());
        let realized = estimate_pnl(
            closed_qty,
            position.entry_price,
            fill_price,
            side_to_type(if position.qty > 0.0 { Side::Buy } else { Side::Sell }),
            0.0,
        )?;

        position.qty += signed_fill;
        if position.qty.abs() < f64::EPSILON {
            *position = Position::default();
        } else if position.qty.signum() == signed_fill.signum() {
            // The fill flipped the position; the residual opens at the fill.
            position.entry_price = fill_price;
        }
        Ok(realized)
    }
}

impl Exchange for FuturesExchange {
    fn name(&self) -> ExchangeId {
        self.name
    }

    fn on_order_submission(&self, order: &Order) -> Result<(), ExecutionError> {
        let mut state = self.state.lock();

        if order.reduce_only {
            let position = state
                .positions
                .get(&order.symbol)
                .copied()
                .unwrap_or_default();
            let reduces = match order.side {
                Side::Buy => position.qty < 0.0,
                Side::Sell => position.qty > 0.0,
            };
            if !reduces {
                return Err(ExecutionError::InvalidOrderForExchange(format!(
                    "reduce-only {} on a {} position",
                    order.side,
                    if position.qty == 0.0 { "flat" } else { "same-side" }
                )));
            }
        }

        // Reduce-only orders shrink exposure and hold no margin of their own.
        let margin = if order.reduce_only {
            0.0
        } else {
            order.qty.abs() * order.price.unwrap_or(0.0) / self.leverage
        };
        let available = state.wallet_balance - state.reserved_margin;
        if margin > available {
            return Err(ExecutionError::InsufficientMargin {
                requested: margin,
                available,
            });
        }
        state.reserved_margin = money::add(state.reserved_margin, margin);

        let (id, record) = OpenOrderRecord::from_order(order, margin);
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

        // Proportional release of the submission's reservation.
        let (released, fully_filled) = state
            .open_orders
            .get_mut(&order.id)
            .map(|record| {
                let released = record.reserved_margin * (fill_qty / order.qty.abs()).min(1.0);
                record.reserved_margin = (record.reserved_margin - released).max(0.0);
                record.remaining = (record.remaining - fill_qty).max(0.0);
                (released, record.remaining == 0.0)
            })
            .unwrap_or((0.0, false));
        state.reserved_margin = money::sub(state.reserved_margin, released).max(0.0);
        if fully_filled {
            state.open_orders.remove(&order.id);
        }

        let fee = money::mul(fill_qty * fill_price, self.fee_rate);
        state.wallet_balance = money::sub(state.wallet_balance, fee);

        let signed_fill = fill_qty * order.side.sign();
        let position = state.positions.entry(order.symbol.clone()).or_default();
        let realized = Self::apply_fill_to_position(position, signed_fill, fill_price)?;
        if realized != 0.0 {
            debug!(
                exchange = %self.name,
                symbol = %order.symbol,
                realized,
                "position reduced"
            );
            state.wallet_balance = money::add(state.wallet_balance, realized);
        }
        Ok(())
    }

    fn on_order_cancellation(&self, order: &Order) -> Result<(), ExecutionError> {
        let mut state = self.state.lock();
        if let Some(record) = state.open_orders.remove(&order.id) {
            state.reserved_margin =
                money::sub(state.reserved_margin, record.reserved_margin).max(0.0);
        }
        Ok(())
    }

    fn asset(&self, asset: &str) -> f64 {
        if asset == self.settlement_currency {
            self.wallet_balance()
        } else {
            0.0
        }
    }

    fn set_asset(&self, asset: &str, amount: f64) {
        if asset == self.settlement_currency {
            self.state.lock().wallet_balance = amount;
        }
    }

    fn wallet_balance(&self) -> f64 {
        self.state.lock().wallet_balance
    }

    fn available_margin(&self) -> f64 {
        let state = self.state.lock();
        state.wallet_balance - state.reserved_margin
    }

    fn update_balance_from_stream(&self, asset: &str, amount: f64) -> Result<(), ExecutionError> {
        if !self.live_mode {
            return Err(ExecutionError::NotLiveTrading);
        }
        self.set_asset(asset, amount);
        Ok(())
    }
}
