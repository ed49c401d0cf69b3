//! Error types for the row store layer

use thiserror::Error;

/// Errors that can occur in row store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Connection error (pool exhausted, server unreachable, connection reset)
    #[error("Connection error: {0}")]
    Connection(String),

    /// Unrecognised connection URL
    #[error("Unsupported database URL: {0}")]
    UnsupportedUrl(String),

    /// Database name that cannot be used as an identifier
    #[error("Invalid database name: {0}")]
    InvalidName(String),

    /// Row could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => StoreError::Connection(err.to_string()),
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                StoreError::Decode(err.to_string())
            }
            sqlx::Error::Configuration(_) => StoreError::UnsupportedUrl(err.to_string()),
            sqlx::Error::Database(db_err) => StoreError::Database(db_err.to_string()),
            _ => StoreError::Database(err.to_string()),
        }
    }
}

impl StoreError {
    /// Whether the error came from losing the connection rather than from the query itself.
    ///
    /// During a leader failover these are the expected failures.
    pub fn is_connection(&self) -> bool {
        matches!(self, StoreError::Connection(_))
    }
}

/// Result type for row store operations
pub type Result<T> = std::result::Result<T, StoreError>;
