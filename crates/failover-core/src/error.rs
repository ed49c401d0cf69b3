//! Harness error types

use failover_state::StoreError;
use thiserror::Error;

/// Errors that abort a stress run
#[derive(Error, Debug)]
pub enum HarnessError {
    /// Store error during setup, baseline or final read
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Seeding failed under the strict policy
    #[error("Seeding failed: {failed} of {attempted} inserts failed")]
    Seed { attempted: u64, failed: u64 },

    /// The failover trigger could not be waited on
    #[error("Trigger error: {0}")]
    Trigger(String),

    /// A worker task panicked or was aborted
    #[error("Worker did not exit cleanly: {0}")]
    Worker(String),

    /// Unknown scenario number
    #[error("Unknown scenario {0} (expected 1-5)")]
    UnknownScenario(u8),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<std::io::Error> for HarnessError {
    fn from(err: std::io::Error) -> Self {
        HarnessError::Trigger(err.to_string())
    }
}

/// Result type for harness operations
pub type Result<T> = std::result::Result<T, HarnessError>;
