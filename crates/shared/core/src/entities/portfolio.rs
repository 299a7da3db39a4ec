use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::values::{Pair, TimestampMs};

/// Per-pair summary of closed positions and remaining open exposure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PairSummary {
    pub pair: Pair,
    pub position_count: usize,
    /// Positions with profit_loss > 0
    pub winning: usize,
    /// Positions with profit_loss < 0
    pub losing: usize,
    pub total_profit_loss: Decimal,
    pub total_fees: Decimal,
    /// Orders still pending in the pair's accumulator
    pub open_orders: usize,
}

impl PairSummary {
    pub fn new(pair: impl Into<Pair>) -> Self {
        Self {
            pair: pair.into(),
            ..Default::default()
        }
    }

    /// Profit after fees
    pub fn net_profit_loss(&self) -> Decimal {
        self.total_profit_loss - self.total_fees
    }

    /// Share of closed positions that were profitable, if any closed
    pub fn win_rate(&self) -> Option<Decimal> {
        if self.position_count == 0 {
            return None;
        }
        Some(Decimal::from(self.winning) / Decimal::from(self.position_count))
    }
}

/// Portfolio-level rollup handed to reporting sinks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioRollup {
    /// When the rollup was produced (ms); the sink's idempotence key
    pub generated_at: TimestampMs,
    /// Pairs in first-encounter order
    pub pairs: Vec<PairSummary>,
    pub position_count: usize,
    pub total_profit_loss: Decimal,
    pub total_fees: Decimal,
    /// Pairs that still hold unmatched orders
    pub open_pairs: usize,
}

impl PortfolioRollup {
    pub fn net_profit_loss(&self) -> Decimal {
        self.total_profit_loss - self.total_fees
    }

    pub fn pair(&self, pair: &str) -> Option<&PairSummary> {
        self.pairs.iter().find(|p| p.pair == pair)
    }
}
