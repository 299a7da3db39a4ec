use rust_decimal::Decimal;
use std::path::Path;
use thiserror::Error;
use tradebook_gateway::{CcxtNormalizer, KrakenNormalizer};
use tradebook_order_manager::MatcherConfig;
use tradebook_ports::TradeNormalizer;

use super::types::{InputFormat, RunnerConfig};

/// Exchange stamped onto ccxt trades when the config names none
const DEFAULT_CCXT_EXCHANGE: &str = "Binance";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("Tolerance must be non-negative, got {0}%")]
    NegativeTolerance(Decimal),
    #[error("No input path configured")]
    MissingInputPath,
}

/// Load runner configuration from a JSON file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<RunnerConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: RunnerConfig = serde_json::from_str(&content)?;
    Ok(config)
}

/// Load configuration from a JSON string
pub fn load_config_from_str(json: &str) -> Result<RunnerConfig, ConfigError> {
    let config: RunnerConfig = serde_json::from_str(json)?;
    Ok(config)
}

/// Load the default embedded configuration
pub fn load_default_config() -> Result<RunnerConfig, ConfigError> {
    let default_config = include_str!("runner_config.json");
    load_config_from_str(default_config)
}

impl RunnerConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tolerance_percent < Decimal::ZERO {
            return Err(ConfigError::NegativeTolerance(self.tolerance_percent));
        }
        if self.input.path.as_os_str().is_empty() {
            return Err(ConfigError::MissingInputPath);
        }
        Ok(())
    }

    pub fn matcher_config(&self) -> MatcherConfig {
        MatcherConfig::with_tolerance(self.tolerance_percent)
    }

    /// Normalizer for the configured input format; `None` for canonical trades
    pub fn normalizer(&self) -> Option<Box<dyn TradeNormalizer>> {
        match self.input.format {
            InputFormat::Canonical => None,
            InputFormat::Ccxt => {
                let exchange = self
                    .input
                    .exchange
                    .as_deref()
                    .unwrap_or(DEFAULT_CCXT_EXCHANGE);
                Some(Box::new(CcxtNormalizer::new(exchange)))
            }
            InputFormat::Kraken => {
                let normalizer = KrakenNormalizer::new();
                Some(Box::new(if self.input.unify_pairs {
                    normalizer.with_unified_pairs()
                } else {
                    normalizer
                }))
            }
        }
    }
}
