//! Kraken asset codes and pair names
//!
//! Kraken concatenates asset codes without a separator (`XETHZUSD`,
//! `XXBTZEUR`, `MATICUSD`), so a pair can only be split against the list of
//! codes it is known to use.

/// Known Kraken asset codes, tried in this order as pair prefixes
const ASSET_CODES: &[&str] = &[
    "XETH", "XXBT", "MATIC", "ZUSD", "ZEUR", "XBT", "USDC", "ETH", "XXBTZ", "XDG", "USD", "QNT",
    "SOL", "AKT", "NEAR", "INJ",
];

/// A Kraken pair split into its base and quote asset codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KrakenPair<'a> {
    pub base: &'a str,
    pub quote: &'a str,
}

impl KrakenPair<'_> {
    /// `BASE/QUOTE` in common symbols, if both assets translate
    pub fn unified(&self) -> Option<String> {
        Some(format!("{}/{}", asset_symbol(self.base)?, asset_symbol(self.quote)?))
    }
}

/// Split a Kraken pair name into known asset codes.
///
/// ```
/// use tradebook_gateway::parse_kraken_pair;
///
/// let pair = parse_kraken_pair("XETHZUSD").unwrap();
/// assert_eq!((pair.base, pair.quote), ("XETH", "ZUSD"));
/// assert!(parse_kraken_pair("FOOBAR").is_none());
/// ```
pub fn parse_kraken_pair(pair: &str) -> Option<KrakenPair<'_>> {
    ASSET_CODES.iter().find_map(|code| {
        let quote = pair.strip_prefix(code)?;
        ASSET_CODES
            .contains(&quote)
            .then_some(KrakenPair { base: *code, quote })
    })
}

/// Base asset code of a Kraken pair
pub fn base_asset(pair: &str) -> Option<&str> {
    parse_kraken_pair(pair).map(|p| p.base)
}

/// Translate a Kraken asset code to its common symbol (`XXBT` -> `BTC`)
pub fn asset_symbol(code: &str) -> Option<&'static str> {
    let symbol = match code {
        "XETH" | "ETH" => "ETH",
        "XXBT" | "XBT" => "BTC",
        "ZUSD" | "USD" => "USD",
        "ZEUR" => "EUR",
        "XDG" => "XDG",
        "MATIC" => "MATIC",
        "QNT" => "QNT",
        "SOL" => "SOL",
        "INJ" => "INJ",
        "USDC" => "USDC",
        _ => return None,
    };
    Some(symbol)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_pairs() {
        let cases = [
            ("XETHZUSD", "XETH", "ZUSD"),
            ("XXBTZEUR", "XXBT", "ZEUR"),
            ("XXBTZUSD", "XXBT", "ZUSD"),
            ("MATICUSD", "MATIC", "USD"),
            ("SOLUSDC", "SOL", "USDC"),
        ];
        for (raw, base, quote) in cases {
            let pair = parse_kraken_pair(raw).unwrap();
            assert_eq!(pair.base, base, "{raw}");
            assert_eq!(pair.quote, quote, "{raw}");
        }
        // bare EUR is not a Kraken code
        assert_eq!(parse_kraken_pair("INJEUR"), None);
    }

    #[test]
    fn test_unknown_pair() {
        assert_eq!(parse_kraken_pair("DOGEUSD"), None);
        assert_eq!(parse_kraken_pair(""), None);
        assert_eq!(base_asset("XETH"), None);
    }

    #[test]
    fn test_base_asset() {
        assert_eq!(base_asset("XETHZUSD"), Some("XETH"));
        assert_eq!(base_asset("QNTUSD"), Some("QNT"));
    }

    #[test]
    fn test_asset_symbol_translation() {
        assert_eq!(asset_symbol("XXBT"), Some("BTC"));
        assert_eq!(asset_symbol("XBT"), Some("BTC"));
        assert_eq!(asset_symbol("ZEUR"), Some("EUR"));
        assert_eq!(asset_symbol("AKT"), None);
    }

    #[test]
    fn test_unified_pair() {
        let pair = parse_kraken_pair("XXBTZUSD").unwrap();
        assert_eq!(pair.unified().as_deref(), Some("BTC/USD"));
        let pair = parse_kraken_pair("AKTUSD").unwrap();
        assert_eq!(pair.unified(), None);
    }
}
