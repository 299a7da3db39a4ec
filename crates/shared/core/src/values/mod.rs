use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Price value - uses Decimal for precision
pub type Price = Decimal;

/// Volume (base quantity) value - uses Decimal for precision
pub type Volume = Decimal;

/// Milliseconds since the Unix epoch, as reported by exchanges
pub type TimestampMs = i64;

/// Trading pair identifier (e.g. "BTC/USDT", "XETHZUSD").
/// Opaque grouping key: never validated against a market list.
pub type Pair = String;

/// Convert an exchange millisecond timestamp to a UTC datetime.
///
/// Returns `None` when the value is outside chrono's representable range.
pub fn timestamp_to_datetime(timestamp: TimestampMs) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_to_datetime() {
        let dt = timestamp_to_datetime(1_705_310_656_789).unwrap();
        assert_eq!(dt.timestamp_millis(), 1_705_310_656_789);
        assert_eq!(dt.format("%Y-%m-%d").to_string(), "2024-01-15");
    }

    #[test]
    fn test_timestamp_out_of_range() {
        assert!(timestamp_to_datetime(i64::MAX).is_none());
    }
}
