//! Per-pair running state of the position matcher

use crate::error::{Error, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tradebook_core::{OrderAggregate, Pair, PositionType, Side, Volume};

/// Running buy/sell totals for one pair since its last closed position
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PairAccumulator {
    pub buy_volume: Volume,
    pub sell_volume: Volume,
    /// Sum of volume * average_price over pending buy orders
    pub buy_cost: Decimal,
    /// Sum of volume * average_price over pending sell orders
    pub sell_cost: Decimal,
    /// Orders since the last reset, in processing order
    pub pending_orders: Vec<OrderAggregate>,
}

impl PairAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an order's volume and cost to its side and queue it.
    ///
    /// On overflow the accumulator is left unchanged.
    pub fn add(&mut self, order: OrderAggregate) -> Result<()> {
        let (volume, cost) = match order.side {
            Side::Buy => (&mut self.buy_volume, &mut self.buy_cost),
            Side::Sell => (&mut self.sell_volume, &mut self.sell_cost),
        };
        let totals = order.cost().and_then(|order_cost| {
            Some((
                volume.checked_add(order.total_volume)?,
                cost.checked_add(order_cost)?,
            ))
        });
        let Some((new_volume, new_cost)) = totals else {
            return Err(Error::Overflow { pair: order.pair });
        };

        *volume = new_volume;
        *cost = new_cost;
        self.pending_orders.push(order);
        Ok(())
    }

    /// `|buy - sell| / ((buy + sell) / 2) * 100`
    ///
    /// `None` when both volumes are zero, where the ratio is undefined.
    pub fn imbalance_percent(&self) -> Option<Decimal> {
        let mean = match self.buy_volume.checked_add(self.sell_volume) {
            Some(sum) => sum / dec!(2),
            None => self.buy_volume / dec!(2) + self.sell_volume / dec!(2),
        };
        if mean.is_zero() {
            return None;
        }
        Some((self.buy_volume - self.sell_volume).abs() / mean * dec!(100))
    }

    /// Volume-balance test against a tolerance in percent
    pub fn is_balanced(&self, tolerance_percent: Decimal) -> Option<bool> {
        self.imbalance_percent()
            .map(|ratio| ratio <= tolerance_percent)
    }

    /// Long if more was bought, short if more was sold; an exact tie
    /// takes the side of the order that opened the run.
    pub fn position_type(&self) -> PositionType {
        if self.buy_volume > self.sell_volume {
            PositionType::Long
        } else if self.sell_volume > self.buy_volume {
            PositionType::Short
        } else {
            self.pending_orders
                .first()
                .map(|o| PositionType::opened_by(o.side))
                .unwrap_or(PositionType::Short)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pending_orders.is_empty()
    }

    /// Zero the totals and hand back the pending orders
    pub fn reset(&mut self) -> Vec<OrderAggregate> {
        std::mem::take(self).pending_orders
    }

    /// Read-only snapshot of an unclosed run
    pub fn snapshot(&self, pair: &str) -> OpenExposure {
        OpenExposure {
            pair: pair.to_string(),
            buy_volume: self.buy_volume,
            sell_volume: self.sell_volume,
            buy_cost: self.buy_cost,
            sell_cost: self.sell_cost,
            pending_orders: self.pending_orders.clone(),
        }
    }
}

/// Orders left unmatched on a pair when matching completed.
///
/// Open exposure is reported as-is; it never becomes a position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenExposure {
    pub pair: Pair,
    pub buy_volume: Volume,
    pub sell_volume: Volume,
    pub buy_cost: Decimal,
    pub sell_cost: Decimal,
    pub pending_orders: Vec<OrderAggregate>,
}

impl OpenExposure {
    /// Signed volume still held (positive = net bought)
    pub fn net_volume(&self) -> Volume {
        self.buy_volume - self.sell_volume
    }
}
