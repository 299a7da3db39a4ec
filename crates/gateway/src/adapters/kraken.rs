//! Normalizer for Kraken `TradesHistory` entries

use super::fields::Fields;
use super::symbols::parse_kraken_pair;
use log::debug;
use serde_json::Value;
use tradebook_core::{Side, Trade};
use tradebook_ports::{NormalizeError, TradeNormalizer};

const EXCHANGE: &str = "Kraken";

/// Normalizes one entry of Kraken's private `TradesHistory` result:
///
/// ```text
/// "TXID": { "ordertxid", "pair", "time" (fractional seconds), "type",
///           "ordertype", "price", "cost", "fee", "vol", ... }
/// ```
///
/// Kraken keys trades by txid, so the id is read from an injected `id`
/// field (see [`normalize_batch`](crate::normalize_batch)), falling back to
/// Kraken's numeric `trade_id`.
#[derive(Debug, Clone, Default)]
pub struct KrakenNormalizer {
    unify_pairs: bool,
}

impl KrakenNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rewrite pairs to `BASE/QUOTE` common symbols (`XXBTZUSD` -> `BTC/USD`).
    /// Pairs that cannot be translated keep their Kraken name.
    pub fn with_unified_pairs(mut self) -> Self {
        self.unify_pairs = true;
        self
    }

    fn pair(&self, raw: &str) -> String {
        if !self.unify_pairs {
            return raw.to_string();
        }
        match parse_kraken_pair(raw).and_then(|p| p.unified()) {
            Some(unified) => unified,
            None => {
                debug!("Kraken pair {raw} has no unified name, keeping it as-is");
                raw.to_string()
            }
        }
    }
}

impl TradeNormalizer for KrakenNormalizer {
    fn normalize(&self, raw: &Value) -> Result<Trade, NormalizeError> {
        let f = Fields::new(EXCHANGE, raw)?;

        let side = f.str("type")?;
        let side: Side = side.parse().map_err(|_| NormalizeError::InvalidField {
            exchange: EXCHANGE.to_string(),
            field: "type".to_string(),
            value: side.to_string(),
        })?;

        let price = f.decimal("price")?;
        let volume = f.decimal("vol")?;

        Ok(Trade {
            id: f.first_id(&["id", "trade_id"])?,
            order_id: f.id("ordertxid")?,
            pair: self.pair(f.str("pair")?),
            timestamp: f.seconds_as_millis("time")?,
            side,
            order_type: f.str_or_empty("ordertype"),
            price,
            cost: f.opt_decimal("cost")?.unwrap_or(price * volume),
            fee: f.opt_decimal("fee")?.unwrap_or_default(),
            volume,
            exchange: EXCHANGE.to_string(),
        })
    }

    fn exchange(&self) -> &str {
        EXCHANGE
    }
}
