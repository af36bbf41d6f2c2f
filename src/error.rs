//! Error types for Sthira

use thiserror::Error;

/// Sthira error type
#[derive(Error, Debug)]
pub enum SthiraError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Record error: {0}")]
    Record(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for SthiraError {
    fn from(e: serde_json::Error) -> Self {
        SthiraError::Record(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SthiraError>;
