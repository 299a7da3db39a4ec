use tradebook_core::Trade;

use crate::error::SourceError;

/// Port for producers of canonical trades.
///
/// No ordering guarantee is required: the aggregator groups by order id
/// regardless of arrival order.
pub trait TradeSource {
    /// Fetch every available trade
    fn fetch_trades(&mut self) -> Result<Vec<Trade>, SourceError>;

    /// Get the source's name/identifier for logging
    fn name(&self) -> &str {
        "TradeSource"
    }
}
