//! Tradebook Gateway
//!
//! Gateway layer for the tradebook reduction. Converts exchange trade
//! payloads into canonical [`Trade`](tradebook_core::Trade)s:
//! - ccxt-style unified trades ([`CcxtNormalizer`])
//! - Kraken `TradesHistory` entries ([`KrakenNormalizer`])
//!
//! ## Architecture
//!
//! ```text
//! Exchange payloads (ccxt, Kraken)
//!         │
//!    ┌────▼──────┐
//!    │ Gateway   │  TradeNormalizer per payload shape
//!    │ adapters  │
//!    └────┬──────┘
//!         │ canonical Trade
//!    ┌────▼──────┐
//!    │ Aggregator│
//!    │ / Matcher │
//!    └───────────┘
//! ```

pub mod adapters;

// Re-export commonly used types
pub use adapters::{
    BatchOutcome, CcxtNormalizer, KrakenNormalizer, normalize_batch,
    symbols::{KrakenPair, asset_symbol, base_asset, parse_kraken_pair},
};
