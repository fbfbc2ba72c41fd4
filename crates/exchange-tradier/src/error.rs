//! Error types for the Tradier integration.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TradierError {
    /// Network-level failure (connect, timeout, TLS).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-success HTTP status from the API.
    #[error("API error: {status_code} - {message}")]
    Api {
        status_code: u16,
        message: String,
    },

    /// Response body did not match the expected shape.
    #[error("decode error: {0}")]
    Decode(String),
}

pub type Result<T> = std::result::Result<T, TradierError>;
