use thiserror::Error;

/// Errors raised while turning an exchange payload into a canonical trade
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("Missing field `{field}` in {exchange} trade")]
    MissingField { exchange: String, field: String },

    #[error("Invalid value for `{field}` in {exchange} trade: {value}")]
    InvalidField {
        exchange: String,
        field: String,
        value: String,
    },

    #[error("Unsupported payload shape: {0}")]
    UnsupportedPayload(String),

    #[error("Malformed trade record #{index}: {reason}")]
    MalformedRecord { index: usize, reason: String },
}

/// Errors raised by a trade source
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Failed to read trades: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse trades: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to normalize trades: {0}")]
    Normalize(#[from] NormalizeError),

    #[error("Source unavailable: {0}")]
    Unavailable(String),
}

/// Errors raised by a reporting sink
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Sink rejected record {key}: {reason}")]
    Rejected { key: String, reason: String },
}
