//! Error types for focusdo-core

use thiserror::Error;

/// Main error type for the focusdo-core library
#[derive(Error, Debug)]
pub enum Error {
    /// SQLite error from the durable key-value store
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Key-value store failure that is not a SQLite error
    #[error("storage error: {0}")]
    Storage(String),

    /// Focus timer transition that is not allowed in the current state
    #[error("timer error: {0}")]
    Timer(String),
}

/// Result type alias for focusdo-core
pub type Result<T> = std::result::Result<T, Error>;
