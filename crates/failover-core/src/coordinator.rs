//! Scenario coordinator
//!
//! Drives one run through its phases:
//!
//! 1. **Idle**: seed the store and read the baseline row count
//! 2. **Running**: launch the scenario's workers
//! 3. **AwaitTrigger**: block until the leader has been killed
//! 4. **Draining**: fire the stop signal and join every worker
//! 5. **Verify**: compare the final row count with the expected count
//!
//! Verify never starts while a worker is still running.

use failover_state::RowStore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tracing::{error, info};

use crate::check::{self, Verdict};
use crate::seeder::{SeedReport, Seeder};
use crate::trigger::FailoverTrigger;
use crate::worker::{Worker, WorkerStats};
use crate::{
    ExpectedCount, HarnessConfig, HarnessError, Result, Scenario, SeedPolicy, StopSignal,
};

/// Coordinator state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Idle,
    Running,
    AwaitTrigger,
    Draining,
    Verify,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Running => "running",
            Phase::AwaitTrigger => "await trigger",
            Phase::Draining => "draining",
            Phase::Verify => "verify",
        };
        f.write_str(name)
    }
}

/// Everything a finished run observed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub scenario: u8,
    pub parallelism: usize,
    pub seed: SeedReport,
    /// Rows present before traffic started
    pub baseline: u64,
    /// Expected row count after drain
    pub expected: u64,
    /// Rows present after drain
    pub actual: u64,
    pub workers: WorkerStats,
    pub elapsed_ms: u64,
    pub verdict: Verdict,
}

/// Runs one scenario against a prepared store
pub struct Coordinator {
    store: Arc<dyn RowStore>,
    trigger: Box<dyn FailoverTrigger>,
    scenario: Scenario,
    max_connections: u32,
    rows_to_seed: u64,
    seed_policy: SeedPolicy,
    phase: Phase,
}

impl Coordinator {
    pub fn new(
        store: Arc<dyn RowStore>,
        trigger: Box<dyn FailoverTrigger>,
        config: &HarnessConfig,
    ) -> Self {
        Self {
            store,
            trigger,
            scenario: config.scenario,
            max_connections: config.max_connections,
            rows_to_seed: config.rows_to_seed,
            seed_policy: config.seed_policy,
            phase: Phase::Idle,
        }
    }

    fn enter(&mut self, phase: Phase) {
        info!("Phase {} -> {}", self.phase, phase);
        self.phase = phase;
    }

    /// Run the scenario to its verdict
    ///
    /// Setup, baseline and final read errors abort the run. A failed
    /// consistency check is not an error: it is reported in the verdict.
    pub async fn run(mut self) -> Result<RunReport> {
        let started = Instant::now();
        info!("running scenario {}", self.scenario);

        let seed = Seeder::new(self.store.clone(), self.seed_policy)
            .seed(self.rows_to_seed)
            .await?;

        let initial = self.store.read_all().await?;
        let baseline = initial.len() as u64;
        let expected = ExpectedCount::new(baseline);
        info!(baseline, "Baseline established");

        self.enter(Phase::Running);
        let (stop, listener) = StopSignal::new();
        let mut workers = JoinSet::new();
        let mut parallelism = 0;
        if let Some((kind, count)) = self.scenario.traffic(self.max_connections) {
            for id in 0..count {
                let worker = Worker::new(
                    id,
                    kind,
                    self.store.clone(),
                    expected.clone(),
                    listener.clone(),
                );
                workers.spawn(worker.run());
            }
            parallelism = count;
            info!(workers = count, %kind, "Traffic started");
        }

        self.enter(Phase::AwaitTrigger);
        let triggered = self.trigger.wait().await;

        self.enter(Phase::Draining);
        stop.fire();
        let (totals, drain_result) = drain(&mut workers).await;
        info!(
            iterations = totals.iterations,
            successes = totals.successes,
            failures = totals.failures,
            connection_errors = totals.connection_errors,
            mismatches = totals.mismatches,
            "All workers stopped"
        );

        // Workers are drained before either error is surfaced
        triggered?;
        drain_result?;

        self.enter(Phase::Verify);
        let final_rows = self.store.read_all().await?;
        let actual = final_rows.len() as u64;
        let expected = expected.load();
        let verdict = check::verify(expected, actual, totals.mismatches);

        if verdict.is_consistent() {
            info!(expected, actual, "Consistency check passed");
        } else {
            error!(expected, actual, "Consistency check failed: {}", verdict);
        }

        Ok(RunReport {
            scenario: self.scenario.number(),
            parallelism,
            seed,
            baseline,
            expected,
            actual,
            workers: totals,
            elapsed_ms: started.elapsed().as_millis() as u64,
            verdict,
        })
    }
}

/// Join every worker, summing stats and keeping the first failure
async fn drain(workers: &mut JoinSet<WorkerStats>) -> (WorkerStats, Result<()>) {
    let mut totals = WorkerStats::default();
    let mut result = Ok(());
    while let Some(joined) = workers.join_next().await {
        match joined {
            Ok(stats) => totals += stats,
            Err(e) => {
                error!("worker task failed: {}", e);
                if result.is_ok() {
                    result = Err(HarnessError::Worker(e.to_string()));
                }
            }
        }
    }
    (totals, result)
}
