use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{OrderAggregate, Side};
use crate::values::{Pair, Price, TimestampMs, Volume, timestamp_to_datetime};

/// Position type - long (bought first) or short (sold first)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionType {
    /// Long position - profit when the sell leg is worth more than the buy leg
    Long,
    /// Short position - profit when the buy leg is cheaper than the sell leg
    Short,
}

impl PositionType {
    /// The type a run takes when it was opened on `side`
    pub fn opened_by(side: Side) -> Self {
        match side {
            Side::Buy => PositionType::Long,
            Side::Sell => PositionType::Short,
        }
    }

    /// Realized profit (negative = loss) for the given leg costs
    pub fn profit_loss(&self, buy_cost: Decimal, sell_cost: Decimal) -> Decimal {
        match self {
            PositionType::Long => sell_cost - buy_cost,
            PositionType::Short => buy_cost - sell_cost,
        }
    }
}

/// A closed round-trip: a run of orders on one pair whose buy and sell
/// volumes balanced within tolerance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub pair: Pair,
    /// Timestamp of the first trade of the first order in the run (ms)
    pub open_time: TimestampMs,
    pub position_type: PositionType,
    /// Total quote value of the buy leg
    pub buy_cost: Decimal,
    /// Total quote value of the sell leg
    pub sell_cost: Decimal,
    pub profit_loss: Decimal,
    /// Reference price: price of the first trade of the run
    pub price: Price,
    /// Orders making up the run, in processing order
    pub orders: Vec<OrderAggregate>,
}

impl Position {
    /// Idempotence key used by reporting sinks (`pair@open_time`)
    pub fn key(&self) -> String {
        format!("{}@{}", self.pair, self.open_time)
    }

    pub fn open_date(&self) -> Option<DateTime<Utc>> {
        timestamp_to_datetime(self.open_time)
    }

    /// Time of the last fill of the closing order
    pub fn close_time(&self) -> Option<TimestampMs> {
        self.orders
            .last()
            .and_then(|o| o.trades.iter().map(|t| t.timestamp).max())
    }

    pub fn buy_volume(&self) -> Volume {
        self.volume_on(Side::Buy)
    }

    pub fn sell_volume(&self) -> Volume {
        self.volume_on(Side::Sell)
    }

    /// Fees across every fill of every order in the run
    pub fn total_fees(&self) -> Decimal {
        self.orders.iter().map(|o| o.total_fees()).sum()
    }

    pub fn is_profitable(&self) -> bool {
        self.profit_loss > Decimal::ZERO
    }

    fn volume_on(&self, side: Side) -> Volume {
        self.orders
            .iter()
            .filter(|o| o.side == side)
            .map(|o| o.total_volume)
            .sum()
    }
}
