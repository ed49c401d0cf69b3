//! Traffic workers
//!
//! A worker loops one kind of operation against the store until the stop
//! signal fires. The signal is polled before each iteration and never
//! interrupts a query in flight, so a worker stops at most one operation
//! after the signal fires.
//!
//! Per-operation errors are logged and counted, never fatal: rejected
//! queries during the failover window are exactly what the run observes.

use failover_state::{Cat, RowStore, StoreError};
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::{ExpectedCount, StopListener, WorkerKind};

/// Counters returned by a worker after it exits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerStats {
    /// Loop iterations started
    pub iterations: u64,
    /// Operations the store acknowledged
    pub successes: u64,
    /// Operations that returned an error
    pub failures: u64,
    /// Failures caused by a lost or unavailable connection, a subset of `failures`
    pub connection_errors: u64,
    /// Reads whose row count differed from the expected count
    pub mismatches: u64,
}

impl AddAssign for WorkerStats {
    fn add_assign(&mut self, other: Self) {
        self.iterations += other.iterations;
        self.successes += other.successes;
        self.failures += other.failures;
        self.connection_errors += other.connection_errors;
        self.mismatches += other.mismatches;
    }
}

impl WorkerStats {
    fn record_failure(&mut self, worker: usize, op: &str, err: &StoreError) {
        self.failures += 1;
        if err.is_connection() {
            self.connection_errors += 1;
            warn!(worker, "lost connection during {}: {}", op, err);
        } else {
            warn!(worker, "failed {}: {}", op, err);
        }
    }
}

/// One traffic-generating task
pub struct Worker {
    id: usize,
    kind: WorkerKind,
    store: Arc<dyn RowStore>,
    expected: ExpectedCount,
    stop: StopListener,
}

impl Worker {
    pub fn new(
        id: usize,
        kind: WorkerKind,
        store: Arc<dyn RowStore>,
        expected: ExpectedCount,
        stop: StopListener,
    ) -> Self {
        Self {
            id,
            kind,
            store,
            expected,
            stop,
        }
    }

    /// Loop until stopped, returning what this worker observed
    pub async fn run(self) -> WorkerStats {
        debug!(worker = self.id, kind = %self.kind, "Worker started");

        let mut stats = WorkerStats::default();
        while !self.stop.is_fired() {
            stats.iterations += 1;
            match self.kind {
                WorkerKind::Read => self.read_once(&mut stats).await,
                WorkerKind::Write => self.write_once(&mut stats).await,
            }
        }

        debug!(worker = self.id, ?stats, "Worker stopped");
        stats
    }

    async fn read_once(&self, stats: &mut WorkerStats) {
        match self.store.read_all().await {
            Ok(cats) => {
                let expected = self.expected.load();
                let actual = cats.len() as u64;
                if actual == expected {
                    stats.successes += 1;
                } else {
                    stats.mismatches += 1;
                    warn!(
                        worker = self.id,
                        expected, actual, "read returned wrong number of rows"
                    );
                }
            }
            Err(e) => {
                stats.record_failure(self.id, "read", &e);
                // A dead server fails instantly; let other tasks run between attempts
                tokio::task::yield_now().await;
            }
        }
    }

    async fn write_once(&self, stats: &mut WorkerStats) {
        let cat = Cat::random();
        match self.store.insert(&cat).await {
            Ok(()) => {
                // Only after the store acknowledged the row
                self.expected.increment();
                stats.successes += 1;
            }
            Err(e) => {
                stats.record_failure(self.id, "write", &e);
                tokio::task::yield_now().await;
            }
        }
    }
}
