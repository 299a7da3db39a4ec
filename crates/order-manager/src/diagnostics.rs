//! Skipped-record diagnostics

use serde::{Deserialize, Serialize};
use std::fmt;
use tradebook_core::{OrderId, Trade, TradeDefect, TradeId};

/// A trade that was dropped from aggregation, and why
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub trade_id: TradeId,
    pub order_id: OrderId,
    pub pair: String,
    pub defect: TradeDefect,
}

impl Diagnostic {
    pub fn new(trade: &Trade, defect: TradeDefect) -> Self {
        Self {
            trade_id: trade.id.clone(),
            order_id: trade.order_id.clone(),
            pair: trade.pair.clone(),
            defect,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "trade {} (order {}, {}): {}",
            self.trade_id, self.order_id, self.pair, self.defect
        )
    }
}
