//! Error types for the runner crate

use thiserror::Error;
use tradebook_ports::{SinkError, SourceError};

use crate::config::ConfigError;

/// Errors that abort a pipeline run
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Trade source error: {0}")]
    Source(#[from] SourceError),

    #[error("Matching failed: {0}")]
    Matching(#[from] tradebook_order_manager::Error),

    #[error("Reporting sink error: {0}")]
    Sink(#[from] SinkError),
}

pub type Result<T> = std::result::Result<T, RunnerError>;
