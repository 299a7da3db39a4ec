//! Exchange adapters
//!
//! Adapters normalize exchange trade payloads into canonical [`Trade`]s.
//! Each exchange payload shape gets its own [`TradeNormalizer`]; the
//! reduction core never sees anything but the canonical record.

mod ccxt;
mod fields;
mod kraken;
pub mod symbols;

pub use ccxt::CcxtNormalizer;
pub use kraken::KrakenNormalizer;

use log::{debug, info, warn};
use serde_json::Value;
use tradebook_core::Trade;
use tradebook_ports::{NormalizeError, TradeNormalizer};

/// Trades normalized from one payload, plus the entries that failed
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub trades: Vec<Trade>,
    pub errors: Vec<NormalizeError>,
}

/// Normalize a batch of raw trades.
///
/// Accepted shapes:
/// - a JSON array of trade objects
/// - an id-keyed map of trade objects; the key is injected as `id` when the
///   entry has none
/// - a Kraken response envelope `{"result": {"trades": {...}}}`, or just
///   `{"trades": ...}`
///
/// Entries that fail to normalize are collected in
/// [`BatchOutcome::errors`]; only an unrecognized top-level shape is an error.
pub fn normalize_batch(
    normalizer: &dyn TradeNormalizer,
    payload: &Value,
) -> Result<BatchOutcome, NormalizeError> {
    let payload = unwrap_envelope(payload);
    let mut outcome = BatchOutcome::default();

    match payload {
        Value::Array(entries) => {
            for entry in entries {
                push(normalizer, entry, &mut outcome);
            }
        }
        Value::Object(map) if map.values().all(Value::is_object) => {
            for (key, entry) in map {
                let entry = with_id(key, entry);
                push(normalizer, &entry, &mut outcome);
            }
        }
        other => {
            return Err(NormalizeError::UnsupportedPayload(format!(
                "expected an array or id-keyed map of {} trades, got {}",
                normalizer.exchange(),
                kind(other)
            )));
        }
    }

    info!(
        "Normalized {} {} trades ({} rejected)",
        outcome.trades.len(),
        normalizer.exchange(),
        outcome.errors.len()
    );
    Ok(outcome)
}

fn push(normalizer: &dyn TradeNormalizer, entry: &Value, outcome: &mut BatchOutcome) {
    match normalizer.normalize(entry) {
        Ok(trade) => {
            debug!("Normalized trade {} of order {}", trade.id, trade.order_id);
            outcome.trades.push(trade);
        }
        Err(e) => {
            warn!("Rejected {} trade: {}", normalizer.exchange(), e);
            outcome.errors.push(e);
        }
    }
}

/// Strip `{"result": ...}` and `{"trades": ...}` wrappers
fn unwrap_envelope(payload: &Value) -> &Value {
    let mut current = payload;
    for key in ["result", "trades"] {
        if let Some(inner) = current.get(key).filter(|v| v.is_object() || v.is_array()) {
            current = inner;
        }
    }
    current
}

fn with_id(key: &str, entry: &Value) -> Value {
    let mut entry = entry.clone();
    if let Some(obj) = entry.as_object_mut() {
        obj.entry("id")
            .or_insert_with(|| Value::String(key.to_string()));
    }
    entry
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object with non-trade values",
    }
}
