//! Trade sources
//!
//! - [`JsonFileSource`]: a JSON file of canonical trades, or of raw exchange
//!   payloads run through a [`TradeNormalizer`]
//! - [`VecSource`]: trades already in memory

use log::{debug, info, warn};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tradebook_core::Trade;
use tradebook_gateway::normalize_batch;
use tradebook_ports::{NormalizeError, SourceError, TradeNormalizer, TradeSource};

/// Reads every trade from one JSON file
pub struct JsonFileSource {
    path: PathBuf,
    normalizer: Option<Box<dyn TradeNormalizer>>,
    rejected: Vec<NormalizeError>,
}

impl JsonFileSource {
    /// Source of canonical `Trade` records (a JSON array)
    pub fn canonical(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            normalizer: None,
            rejected: Vec::new(),
        }
    }

    /// Source of raw exchange payloads
    pub fn normalized(path: impl Into<PathBuf>, normalizer: Box<dyn TradeNormalizer>) -> Self {
        Self {
            path: path.into(),
            normalizer: Some(normalizer),
            rejected: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Payload entries the normalizer rejected on the last fetch
    pub fn rejected(&self) -> &[NormalizeError] {
        &self.rejected
    }
}

impl TradeSource for JsonFileSource {
    fn fetch_trades(&mut self) -> Result<Vec<Trade>, SourceError> {
        let content = std::fs::read_to_string(&self.path)?;

        let payload: Value = serde_json::from_str(&content)?;
        let (trades, rejected) = match &self.normalizer {
            None => parse_canonical(payload)?,
            Some(normalizer) => {
                let batch = normalize_batch(normalizer.as_ref(), &payload)?;
                (batch.trades, batch.errors)
            }
        };

        if !rejected.is_empty() {
            warn!(
                "{}: {} entries could not be read as trades",
                self.path.display(),
                rejected.len()
            );
        }
        self.rejected = rejected;

        info!("Loaded {} trades from {}", trades.len(), self.path.display());
        Ok(trades)
    }

    fn name(&self) -> &str {
        "JsonFileSource"
    }
}

/// Deserialize a JSON array of canonical trades one record at a time, so a
/// malformed record is rejected without losing the rest of the file
fn parse_canonical(payload: Value) -> Result<(Vec<Trade>, Vec<NormalizeError>), SourceError> {
    let entries: Vec<Value> = serde_json::from_value(payload)?;
    let mut trades = Vec::with_capacity(entries.len());
    let mut rejected = Vec::new();

    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<Trade>(entry) {
            Ok(trade) => trades.push(trade),
            Err(e) => {
                debug!("Rejected canonical trade #{index}: {e}");
                rejected.push(NormalizeError::MalformedRecord {
                    index,
                    reason: e.to_string(),
                });
            }
        }
    }
    Ok((trades, rejected))
}

/// In-memory trade source; hands its trades out once
#[derive(Debug, Clone, Default)]
pub struct VecSource {
    trades: Vec<Trade>,
}

impl VecSource {
    pub fn new(trades: Vec<Trade>) -> Self {
        Self { trades }
    }
}

impl TradeSource for VecSource {
    fn fetch_trades(&mut self) -> Result<Vec<Trade>, SourceError> {
        Ok(std::mem::take(&mut self.trades))
    }

    fn name(&self) -> &str {
        "VecSource"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;
    use tradebook_core::Side;
    use tradebook_gateway::KrakenNormalizer;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_canonical_file() {
        let trade = Trade::new("t-1", "o-1", "BTC/USDT", Side::Buy, dec!(100), dec!(2), 1_000);
        let file = write_temp(&serde_json::to_string(&vec![trade.clone()]).unwrap());

        let mut source = JsonFileSource::canonical(file.path());
        assert_eq!(source.fetch_trades().unwrap(), vec![trade]);
        assert!(source.rejected().is_empty());
    }

    #[test]
    fn test_canonical_file_skips_malformed_records() {
        let file = write_temp(
            r#"[
                {"id": "t-1", "order_id": "o-1", "pair": "BTC/USDT", "timestamp": 1000,
                 "side": "buy", "price": "100", "volume": "2"},
                {"id": "t-2", "order_id": "o-1", "pair": "BTC/USDT", "timestamp": 2000,
                 "side": "buy", "volume": "1"}
            ]"#,
        );

        let mut source = JsonFileSource::canonical(file.path());
        let trades = source.fetch_trades().unwrap();

        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].id, "t-1");
        assert!(matches!(
            source.rejected(),
            [NormalizeError::MalformedRecord { index: 1, reason }] if reason.contains("price")
        ));
    }

    #[test]
    fn test_canonical_file_must_be_an_array() {
        let file = write_temp(r#"{"id": "t-1"}"#);
        let mut source = JsonFileSource::canonical(file.path());
        assert!(matches!(source.fetch_trades(), Err(SourceError::Parse(_))));
    }

    #[test]
    fn test_kraken_file_collects_rejections() {
        let file = write_temp(
            r#"{"result": {"trades": {
                "T1": {"ordertxid": "O1", "pair": "XETHZUSD", "time": 1.5, "type": "buy",
                       "ordertype": "limit", "price": "1800", "cost": "180", "fee": "0.2", "vol": "0.1"},
                "T2": {"ordertxid": "O1", "pair": "XETHZUSD", "time": 2.0, "type": "buy"}
            }}}"#,
        );

        let mut source = JsonFileSource::normalized(file.path(), Box::new(KrakenNormalizer::new()));
        let trades = source.fetch_trades().unwrap();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].id, "T1");
        assert_eq!(trades[0].timestamp, 1_500);
        assert_eq!(source.rejected().len(), 1);
    }

    #[test]
    fn test_missing_file() {
        let mut source = JsonFileSource::canonical("/definitely/not/here.json");
        assert!(matches!(source.fetch_trades(), Err(SourceError::Io(_))));
    }

    #[test]
    fn test_malformed_json() {
        let file = write_temp("[{\"id\": ");
        let mut source = JsonFileSource::canonical(file.path());
        assert!(matches!(source.fetch_trades(), Err(SourceError::Parse(_))));
    }

    #[test]
    fn test_vec_source_drains() {
        let trade = Trade::new("t-1", "o-1", "BTC/USDT", Side::Buy, dec!(1), dec!(1), 0);
        let mut source = VecSource::new(vec![trade]);
        assert_eq!(source.fetch_trades().unwrap().len(), 1);
        assert!(source.fetch_trades().unwrap().is_empty());
    }
}
