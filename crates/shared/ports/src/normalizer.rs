use serde_json::Value;
use tradebook_core::Trade;

use crate::error::NormalizeError;

/// Port for exchange-specific payload conversion.
///
/// All polymorphism over exchange payload shapes lives behind this trait;
/// the core only ever sees the canonical [`Trade`].
pub trait TradeNormalizer: Send + Sync {
    /// Convert one raw payload into a canonical trade
    fn normalize(&self, raw: &Value) -> Result<Trade, NormalizeError>;

    /// Exchange name stamped onto produced trades
    fn exchange(&self) -> &str;
}
