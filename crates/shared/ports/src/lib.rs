//! Tradebook Ports
//!
//! Port definitions (traits) for the collaborators around the core reduction.
//! These define the boundaries between domain logic and infrastructure:
//! - where canonical trades come from ([`TradeSource`], [`TradeNormalizer`])
//! - where order aggregates, positions and rollups go ([`ReportingSink`])

mod error;
mod normalizer;
mod sink;
mod source;

pub use error::{NormalizeError, SinkError, SourceError};
pub use normalizer::TradeNormalizer;
pub use sink::{RecordOutcome, ReportingSink, SinkSummary};
pub use source::TradeSource;
