use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{OrderId, Side, Trade};
use crate::values::{Pair, Price, TimestampMs, Volume};

/// Volume-weighted summary of every fill sharing one order id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderAggregate {
    pub order_id: OrderId,
    pub pair: Pair,
    pub side: Side,
    /// Time of the first constituent trade (ms)
    pub open_time: TimestampMs,
    /// Sum of constituent trade volumes
    pub total_volume: Volume,
    pub highest_price: Price,
    pub lowest_price: Price,
    /// Volume-weighted average fill price
    pub average_price: Price,
    pub exchange: String,
    /// Constituent fills in arrival order (not necessarily timestamp order)
    pub trades: Vec<Trade>,
}

impl OrderAggregate {
    /// Quote value of the order at its average price; `None` when it overflows
    pub fn cost(&self) -> Option<Decimal> {
        self.total_volume.checked_mul(self.average_price)
    }

    /// Total fees paid across all fills
    pub fn total_fees(&self) -> Decimal {
        self.trades.iter().map(|t| t.fee).sum()
    }

    /// First fill in arrival order
    pub fn first_trade(&self) -> Option<&Trade> {
        self.trades.first()
    }
}
