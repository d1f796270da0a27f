use crate::error::InstrumentError;
use serde::{Deserialize, Serialize};

/// Lifecycle state of an order.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Active,
    Canceled,
    Executed,
    PartiallyFilled,
    Queued,
    Liquidated,
    Rejected,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Active => "active",
            OrderStatus::Canceled => "canceled",
            OrderStatus::Executed => "executed",
            OrderStatus::PartiallyFilled => "partially_filled",
            OrderStatus::Queued => "queued",
            OrderStatus::Liquidated => "liquidated",
            OrderStatus::Rejected => "rejected",
        }
    }

    /// Terminal states admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Canceled
                | OrderStatus::Executed
                | OrderStatus::Liquidated
                | OrderStatus::Rejected
        )
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = InstrumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(OrderStatus::Active),
            "canceled" => Ok(OrderStatus::Canceled),
            "executed" => Ok(OrderStatus::Executed),
            "partially_filled" => Ok(OrderStatus::PartiallyFilled),
            "queued" => Ok(OrderStatus::Queued),
            "liquidated" => Ok(OrderStatus::Liquidated),
            "rejected" => Ok(OrderStatus::Rejected),
            other => Err(InstrumentError::InvalidOrderStatus(other.to_string())),
        }
    }
}

/// Execution instruction attached to an order.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    Market,
    Limit,
    Stop,
    StopLimit,
    Fok,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Market => "market",
            OrderType::Limit => "limit",
            OrderType::Stop => "stop",
            OrderType::StopLimit => "stop_limit",
            OrderType::Fok => "fok",
        }
    }

    /// Whether this type must carry a price at submission time.
    pub fn requires_price(&self) -> bool {
        !matches!(self, OrderType::Market)
    }
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OrderType {
    type Err = InstrumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "market" => Ok(OrderType::Market),
            "limit" => Ok(OrderType::Limit),
            "stop" => Ok(OrderType::Stop),
            "stop_limit" => Ok(OrderType::StopLimit),
            "fok" => Ok(OrderType::Fok),
            other => Err(InstrumentError::InvalidOrderType(other.to_string())),
        }
    }
}

/// Which automated exit produced an order, when any did.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum OrderSubmittedVia {
    StopLoss,
    TakeProfit,
}

impl OrderSubmittedVia {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSubmittedVia::StopLoss => "stop_loss",
            OrderSubmittedVia::TakeProfit => "take_profit",
        }
    }
}

impl std::fmt::Display for OrderSubmittedVia {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
