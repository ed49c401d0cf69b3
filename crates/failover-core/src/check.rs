//! Consistency check run after the workers have drained

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of comparing the store against the expected row count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    /// Final row count matches and no read saw a wrong count
    Consistent,
    /// Acknowledged writes are missing from the store
    MissingRows { expected: u64, actual: u64 },
    /// The store holds rows that were never acknowledged
    ExtraRows { expected: u64, actual: u64 },
    /// Final count matches, but read workers saw a wrong count mid-run
    ReadMismatches { count: u64 },
}

impl Verdict {
    pub fn is_consistent(&self) -> bool {
        matches!(self, Verdict::Consistent)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Consistent => write!(f, "consistent"),
            Verdict::MissingRows { expected, actual } => write!(
                f,
                "expected {} rows but found {} ({} lost)",
                expected,
                actual,
                expected - actual
            ),
            Verdict::ExtraRows { expected, actual } => write!(
                f,
                "expected {} rows but found {} ({} unacknowledged)",
                expected,
                actual,
                actual - expected
            ),
            Verdict::ReadMismatches { count } => {
                write!(f, "{} reads returned the wrong number of rows", count)
            }
        }
    }
}

/// Compare the drained expected count with the final row count
///
/// A final mismatch takes precedence over mismatches read workers saw
/// during the run.
pub fn verify(expected: u64, actual: u64, read_mismatches: u64) -> Verdict {
    if actual < expected {
        Verdict::MissingRows { expected, actual }
    } else if actual > expected {
        Verdict::ExtraRows { expected, actual }
    } else if read_mismatches > 0 {
        Verdict::ReadMismatches {
            count: read_mismatches,
        }
    } else {
        Verdict::Consistent
    }
}
