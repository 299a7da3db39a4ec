//! Tradebook Core Domain
//!
//! Pure domain types for the trade -> order -> position reduction.
//! This crate contains no I/O and is 100% unit testable.

pub mod entities;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{
    // Fills and their per-order summaries
    OrderAggregate,
    OrderId,
    // Portfolio reporting
    PairSummary,
    ParseSideError,
    PortfolioRollup,
    // Closed round-trips
    Position,
    PositionType,
    Side,
    Trade,
    TradeDefect,
    TradeId,
};
pub use values::{Pair, Price, TimestampMs, Volume, timestamp_to_datetime};
