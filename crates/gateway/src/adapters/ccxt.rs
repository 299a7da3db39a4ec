//! Normalizer for ccxt-style unified trades (Binance, Bybit, ...)

use super::fields::Fields;
use serde_json::Value;
use tradebook_core::{Side, Trade};
use tradebook_ports::{NormalizeError, TradeNormalizer};

/// Normalizes the unified trade structure returned by ccxt's `fetchMyTrades`.
///
/// ```text
/// { "id", "order", "symbol", "timestamp" (ms), "side", "type",
///   "price", "amount", "cost", "fee": { "cost", "currency" } }
/// ```
///
/// A missing `cost` is derived as `price * amount`; a missing fee is zero.
#[derive(Debug, Clone)]
pub struct CcxtNormalizer {
    exchange: String,
}

impl CcxtNormalizer {
    pub fn new(exchange: impl Into<String>) -> Self {
        Self {
            exchange: exchange.into(),
        }
    }
}

impl TradeNormalizer for CcxtNormalizer {
    fn normalize(&self, raw: &Value) -> Result<Trade, NormalizeError> {
        let f = Fields::new(&self.exchange, raw)?;

        let side = f.str("side")?;
        let side: Side = side.parse().map_err(|_| NormalizeError::InvalidField {
            exchange: self.exchange.clone(),
            field: "side".to_string(),
            value: side.to_string(),
        })?;

        let price = f.decimal("price")?;
        let volume = f.decimal("amount")?;
        let cost = f.opt_decimal("cost")?.unwrap_or(price * volume);
        let fee = match f.nested("fee") {
            Some(fee) => fee.opt_decimal("cost")?.unwrap_or_default(),
            None => Default::default(),
        };

        Ok(Trade {
            id: f.id("id")?,
            order_id: f.id("order")?,
            pair: f.str("symbol")?.to_string(),
            timestamp: f.millis("timestamp")?,
            side,
            order_type: f.str_or_empty("type"),
            price,
            cost,
            fee,
            volume,
            exchange: self.exchange.clone(),
        })
    }

    fn exchange(&self) -> &str {
        &self.exchange
    }
}
