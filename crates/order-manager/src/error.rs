//! Order Manager errors

use rust_decimal::Decimal;
use thiserror::Error;

/// Fatal errors of the reduction.
///
/// Malformed trades are not errors: they are skipped and reported as
/// [`crate::Diagnostic`]s so one bad record never aborts a batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Both sides of a pair accumulator were zero when the balance test ran.
    /// Unreachable for orders built by the aggregator (volume is always positive).
    #[error("Degenerate balance for {pair}: buy and sell volume are both zero")]
    DegenerateBalance { pair: String },

    /// A pair's running volume or cost no longer fits in a `Decimal`
    #[error("Arithmetic overflow accumulating {pair}")]
    Overflow { pair: String },

    #[error("Invalid tolerance: {0}% (must be non-negative)")]
    InvalidTolerance(Decimal),
}

pub type Result<T> = std::result::Result<T, Error>;
