//! Error types for Readalong

use std::io;
use thiserror::Error;

/// Main error type for Readalong
#[derive(Error, Debug)]
pub enum ReadalongError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Speech synthesis error: {0}")]
    Speech(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("INI parse error: {0}")]
    IniParse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for Readalong operations
pub type Result<T> = std::result::Result<T, ReadalongError>;

impl From<String> for ReadalongError {
    fn from(s: String) -> Self {
        ReadalongError::Other(s)
    }
}

impl From<&str> for ReadalongError {
    fn from(s: &str) -> Self {
        ReadalongError::Other(s.to_string())
    }
}
