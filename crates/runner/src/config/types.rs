//! Runner configuration file types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Top-level runner configuration (JSON)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Position matching tolerance, in percent of mean volume
    #[serde(default = "default_tolerance")]
    pub tolerance_percent: Decimal,
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_tolerance() -> Decimal {
    Decimal::TWO
}

/// Where trades are read from and how they are shaped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    pub path: PathBuf,
    #[serde(default)]
    pub format: InputFormat,
    /// Exchange name stamped onto ccxt trades
    #[serde(default)]
    pub exchange: Option<String>,
    /// Rewrite Kraken pairs to `BASE/QUOTE` symbols
    #[serde(default)]
    pub unify_pairs: bool,
}

/// Shape of the trade file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    /// Canonical `Trade` records
    #[default]
    Canonical,
    /// ccxt unified trades
    Ccxt,
    /// Kraken `TradesHistory` entries or response
    Kraken,
}

impl InputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputFormat::Canonical => "canonical",
            InputFormat::Ccxt => "ccxt",
            InputFormat::Kraken => "kraken",
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "canonical" => Ok(InputFormat::Canonical),
            "ccxt" => Ok(InputFormat::Ccxt),
            "kraken" => Ok(InputFormat::Kraken),
            other => Err(format!(
                "unknown input format `{other}` (expected canonical, ccxt or kraken)"
            )),
        }
    }
}

/// Where the report goes; `None` keeps it in memory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub path: Option<PathBuf>,
}
