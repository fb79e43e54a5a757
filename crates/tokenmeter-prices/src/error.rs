//! Error types for tokenmeter-prices

use thiserror::Error;

/// Price provider error type
#[derive(Debug, Error)]
pub enum Error {
    /// Remote feed request failed
    #[error("price feed request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// Cache file read/write failed
    #[error("price cache io error: {0}")]
    Io(#[from] std::io::Error),

    /// Cache or feed payload could not be parsed
    #[error("price data parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
