//! Harness configuration
//!
//! One `HarnessConfig` is built at startup and handed to each component.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::{HarnessError, Result};

/// Database created for (and dropped after) a MySQL run
pub const DEFAULT_DATABASE_NAME: &str = "cfMysqlStressTestDb";

/// What to do when a seeding insert fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SeedPolicy {
    /// Log the failure and keep seeding
    #[default]
    BestEffort,
    /// Attempt every row, then fail the run if any insert failed
    Strict,
}

/// How the operator signals that the leader has been killed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TriggerMode {
    /// Prompt on stderr and wait for ENTER on stdin
    #[default]
    Prompt,
    /// Continue on its own after a delay, for unattended runs
    After(Duration),
}

/// Kind of traffic a worker generates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkerKind {
    Read,
    Write,
}

impl fmt::Display for WorkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerKind::Read => write!(f, "read"),
            WorkerKind::Write => write!(f, "write"),
        }
    }
}

/// Traffic pattern held up while the operator kills the leader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scenario {
    /// 1: no traffic, only the failover
    DropLeader,
    /// 2: one read worker
    SingleReader,
    /// 3: one write worker
    SingleWriter,
    /// 4: one read worker per pool connection
    ParallelReaders,
    /// 5: one write worker per pool connection
    ParallelWriters,
}

impl Scenario {
    /// Look up a scenario by its command-line number
    pub fn from_number(number: u8) -> Result<Self> {
        match number {
            1 => Ok(Scenario::DropLeader),
            2 => Ok(Scenario::SingleReader),
            3 => Ok(Scenario::SingleWriter),
            4 => Ok(Scenario::ParallelReaders),
            5 => Ok(Scenario::ParallelWriters),
            other => Err(HarnessError::UnknownScenario(other)),
        }
    }

    /// Command-line number of this scenario
    pub fn number(&self) -> u8 {
        match self {
            Scenario::DropLeader => 1,
            Scenario::SingleReader => 2,
            Scenario::SingleWriter => 3,
            Scenario::ParallelReaders => 4,
            Scenario::ParallelWriters => 5,
        }
    }

    /// Worker kind and count for this scenario, `None` when no traffic runs
    pub fn traffic(&self, max_connections: u32) -> Option<(WorkerKind, usize)> {
        let pool = max_connections.max(1) as usize;
        match self {
            Scenario::DropLeader => None,
            Scenario::SingleReader => Some((WorkerKind::Read, 1)),
            Scenario::SingleWriter => Some((WorkerKind::Write, 1)),
            Scenario::ParallelReaders => Some((WorkerKind::Read, pool)),
            Scenario::ParallelWriters => Some((WorkerKind::Write, pool)),
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Scenario::DropLeader => "drop leader",
            Scenario::SingleReader => "single reader",
            Scenario::SingleWriter => "single writer",
            Scenario::ParallelReaders => "parallel readers",
            Scenario::ParallelWriters => "parallel writers",
        };
        write!(f, "{} ({})", self.number(), name)
    }
}

/// Complete configuration of one stress run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Server connection URL, without database for MySQL
    pub database_url: String,
    /// Database created for the run (MySQL only)
    pub database_name: String,
    /// Traffic pattern
    pub scenario: Scenario,
    /// Connection pool cap, also the parallelism of scenarios 4 and 5
    pub max_connections: u32,
    /// Rows inserted before traffic starts
    pub rows_to_seed: u64,
    /// Failure policy while seeding
    pub seed_policy: SeedPolicy,
    /// Failover trigger
    pub trigger: TriggerMode,
    /// Leave the database in place after the run
    pub keep_database: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            database_name: DEFAULT_DATABASE_NAME.to_string(),
            scenario: Scenario::DropLeader,
            max_connections: 10,
            rows_to_seed: 1000,
            seed_policy: SeedPolicy::BestEffort,
            trigger: TriggerMode::Prompt,
            keep_database: false,
        }
    }
}

impl HarnessConfig {
    /// Reject configurations that cannot run
    pub fn validate(&self) -> Result<()> {
        if self.database_url.is_empty() {
            return Err(HarnessError::Config("database URL is required".into()));
        }
        if self.max_connections == 0 {
            return Err(HarnessError::Config(
                "max connections must be at least 1".into(),
            ));
        }
        if self.database_name.is_empty() {
            return Err(HarnessError::Config("database name is required".into()));
        }
        Ok(())
    }

    /// Number of workers the scenario launches
    pub fn parallelism(&self) -> usize {
        self.scenario
            .traffic(self.max_connections)
            .map(|(_, count)| count)
            .unwrap_or(0)
    }
}
