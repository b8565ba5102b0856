//! Store errors

use std::time::Duration;

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors from the store collaborator
///
/// Messages may carry server details; callers log them and surface a
/// generic message to HTTP clients.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// ClickHouse client error (connection, prepare, write, send, decode)
    #[error("clickhouse error: {0}")]
    ClickHouse(#[from] clickhouse::error::Error),

    /// Operation did not complete within its deadline
    #[error("store operation timed out after {0:?}")]
    Timeout(Duration),

    /// Store is not reachable
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Row or batch rejected by the store
    #[error("write rejected: {0}")]
    Write(String),
}

impl StoreError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        StoreError::Unavailable(msg.into())
    }

    pub fn write(msg: impl Into<String>) -> Self {
        StoreError::Write(msg.into())
    }
}
