//! KvStore error types

use thiserror::Error;

/// Result type for key-value operations
pub type KvResult<T> = Result<T, KvError>;

/// Errors that can occur while reading or writing entries
#[derive(Debug, Error)]
pub enum KvError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}
