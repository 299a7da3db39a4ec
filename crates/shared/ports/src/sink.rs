use tradebook_core::{OrderAggregate, PortfolioRollup, Position};

use crate::error::SinkError;

/// Result of handing one record to a sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Record was new and has been persisted
    Inserted,
    /// A record with the same key already exists; nothing was written
    Skipped,
}

/// Port for persisting reduction results.
///
/// Implementations must be idempotent: the core does not deduplicate
/// against earlier runs, so re-reporting the same record must be a no-op.
/// Keys:
/// - order aggregates: `order_id`
/// - positions: [`Position::key`] (`pair@open_time`)
/// - portfolio rollups: `generated_at`
pub trait ReportingSink {
    fn record_order(&mut self, order: &OrderAggregate) -> Result<RecordOutcome, SinkError>;

    fn record_position(&mut self, position: &Position) -> Result<RecordOutcome, SinkError>;

    fn record_portfolio(&mut self, rollup: &PortfolioRollup) -> Result<RecordOutcome, SinkError>;

    /// Flush buffered records, if the sink buffers
    fn flush(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Counts of what a sink did with one batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkSummary {
    pub inserted: usize,
    pub skipped: usize,
}

impl SinkSummary {
    pub fn add(&mut self, outcome: RecordOutcome) {
        match outcome {
            RecordOutcome::Inserted => self.inserted += 1,
            RecordOutcome::Skipped => self.skipped += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.inserted + self.skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_summary_counts() {
        let mut summary = SinkSummary::default();
        summary.add(RecordOutcome::Inserted);
        summary.add(RecordOutcome::Skipped);
        summary.add(RecordOutcome::Inserted);
        assert_eq!(summary.inserted, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.total(), 3);
    }
}
