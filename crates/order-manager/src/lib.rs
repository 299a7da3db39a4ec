//! Tradebook Order Manager
//!
//! The Order Manager reduces raw fills into two successively coarser views:
//! - **Order Aggregation**: all fills of one order id become one
//!   volume-weighted [`OrderAggregate`](tradebook_core::OrderAggregate)
//! - **Position Matching**: per pair, orders accumulate until buy and sell
//!   volume balance within a tolerance, then close as one
//!   [`Position`](tradebook_core::Position)
//! - **Portfolio Rollup**: per-pair and portfolio totals for reporting
//!
//! ## Architecture
//!
//! ```text
//! Normalizer ──► Trades ──► ┌────────────────────────────────────────┐
//!                           │            Order Manager               │
//!                           │  ┌─────────────────────────────────┐   │
//!                           │  │   Order Aggregator              │   │
//!                           │  │   - Group fills by order id     │   │
//!                           │  │   - Running VWAP, min/max price │   │
//!                           │  │   - Skip malformed fills        │   │
//!                           │  └───────────────┬─────────────────┘   │
//!                           │                  │ Order Aggregates    │
//!                           │  ┌───────────────▼─────────────────┐   │
//!                           │  │   Position Matcher              │   │
//!                           │  │   - One accumulator per pair    │   │
//!                           │  │   - Volume-balance test         │   │
//!                           │  │   - Reset after each position   │   │
//!                           │  └───────────────┬─────────────────┘   │
//!                           │                  │ Positions           │
//!                           │  ┌───────────────▼─────────────────┐   │
//!                           │  │   Portfolio Rollup              │   │
//!                           │  └───────────────┬─────────────────┘   │
//!                           └──────────────────┼─────────────────────┘
//!                                              │
//! Reporting Sink ◄─────────────────────────────┘
//! ```
//!
//! Both stages are synchronous pure reductions: no I/O, no state shared
//! between calls. Callers may run pairs in parallel but must keep each
//! pair's orders in chronological order.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tradebook_order_manager::{aggregate_trades, match_positions, MatcherConfig};
//!
//! let aggregated = aggregate_trades(&trades);
//! for diag in &aggregated.skipped {
//!     eprintln!("skipped {diag}");
//! }
//!
//! let outcome = match_positions(&aggregated.orders, &MatcherConfig::default())?;
//! ```

pub mod accumulator;
pub mod aggregator;
pub mod diagnostics;
pub mod error;
pub mod matcher;
pub mod rollup;

// Re-export main types
pub use accumulator::{OpenExposure, PairAccumulator};
pub use aggregator::{AggregationOutcome, OrderAggregator, aggregate_trades};
pub use diagnostics::Diagnostic;
pub use error::{Error, Result};
pub use matcher::{MatchOutcome, MatcherConfig, PositionMatcher, match_positions};
pub use rollup::build_rollup;
