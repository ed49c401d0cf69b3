//! Initial population of the store

use failover_state::{Cat, RowStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::{HarnessError, Result, SeedPolicy};

/// Outcome of one seeding batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedReport {
    pub attempted: u64,
    pub inserted: u64,
    pub failed: u64,
}

/// Inserts a batch of random rows, one task per row
///
/// Fan-out is unbounded; the store's connection pool is what limits how many
/// inserts are in flight at once.
pub struct Seeder {
    store: Arc<dyn RowStore>,
    policy: SeedPolicy,
}

impl Seeder {
    pub fn new(store: Arc<dyn RowStore>, policy: SeedPolicy) -> Self {
        Self { store, policy }
    }

    /// Insert `rows` rows and wait until every insert has been attempted
    pub async fn seed(&self, rows: u64) -> Result<SeedReport> {
        info!(rows, policy = ?self.policy, "Seeding database");

        let mut tasks = JoinSet::new();
        for _ in 0..rows {
            let store = self.store.clone();
            let cat = Cat::random();
            tasks.spawn(async move { store.insert(&cat).await });
        }

        let mut report = SeedReport {
            attempted: rows,
            ..Default::default()
        };
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(())) => report.inserted += 1,
                Ok(Err(e)) => {
                    report.failed += 1;
                    warn!("failed write: {}", e);
                }
                Err(e) => {
                    report.failed += 1;
                    warn!("seeding task did not complete: {}", e);
                }
            }
        }

        info!(
            inserted = report.inserted,
            failed = report.failed,
            "Seeding complete"
        );

        if report.failed > 0 && self.policy == SeedPolicy::Strict {
            return Err(HarnessError::Seed {
                attempted: report.attempted,
                failed: report.failed,
            });
        }
        Ok(report)
    }
}
