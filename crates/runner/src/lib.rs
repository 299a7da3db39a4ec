//! Tradebook Runner
//!
//! Wires the reduction end to end:
//!
//! - **Config**: JSON runner configuration with an embedded default
//! - **Source**: trade files, canonical or raw exchange payloads
//! - **Pipeline**: aggregation, chronological ordering, matching, rollup
//! - **Sink**: idempotent in-memory or JSON-file reporting
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────┐
//!   │  JsonFileSource  │  canonical | ccxt | kraken
//!   └────────┬─────────┘
//!            │ trades
//!            ▼
//!   ┌──────────────────┐
//!   │  Order Manager   │  aggregate ─► sort ─► match ─► rollup
//!   └────────┬─────────┘
//!            │ orders, positions, rollup
//!            ▼
//!   ┌──────────────────┐
//!   │  ReportingSink   │  MemorySink | JsonFileSink
//!   └──────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod pipeline;
pub mod sink;
pub mod source;

// Re-export main types
pub use config::{
    ConfigError, InputConfig, InputFormat, OutputConfig, RunnerConfig, load_config,
    load_config_from_str, load_default_config,
};
pub use error::{Result, RunnerError};
pub use pipeline::{RunReport, run, run_with_config};
pub use sink::{JsonFileSink, Ledger, MemorySink};
pub use source::{JsonFileSource, VecSource};
