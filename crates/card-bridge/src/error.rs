//! Bridge error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Not authenticated")]
    Unauthorized,

    #[error("API error {status} ({code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Unexpected response: {0}")]
    InvalidResponse(String),

    #[error("Reader error: {0}")]
    Reader(String),

    #[error("Reader closed")]
    ReaderClosed,
}

impl From<reqwest::Error> for BridgeError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            BridgeError::InvalidResponse(e.to_string())
        } else {
            BridgeError::Connection(e.to_string())
        }
    }
}
