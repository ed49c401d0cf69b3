//! Failover Scenario Stress Tests
//!
//! Full coordinator runs against SQLite and the in-memory store:
//! - test_parallel_writers_1000_rows: 10 writers, final count = baseline + acknowledged inserts
//! - test_single_reader_sees_baseline: every read during the run returns the seeded count
//! - test_parallel_readers_sees_baseline: same with one reader per connection
//! - test_drop_leader_without_traffic: scenario 1 keeps the seeded rows
//! - test_writers_survive_rejection_window: rejected inserts are counted, not fatal
//! - test_readers_survive_outage: failed reads are counted, not fatal
//! - test_lost_ack_reported_as_extra_rows: committed-but-unacknowledged writes fail the run
//! - test_dropped_write_reported_as_missing_rows: acknowledged-but-lost writes fail the run
//! - test_phantom_rows_fail_readers: readers flag a count that moved without a writer
//! - test_drain_waits_for_in_flight_operations: verify only starts after every worker exited

use failover_core::{setup, Coordinator, HarnessConfig, Scenario, TriggerMode, Verdict};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::helpers::{init_tracing, sqlite_config, InsertFault, MemoryStore, StoreGateTrigger};

fn memory_config(scenario: Scenario, rows: u64, max_connections: u32) -> HarnessConfig {
    HarnessConfig {
        database_url: "memory".to_string(),
        scenario,
        max_connections,
        rows_to_seed: rows,
        ..Default::default()
    }
}

/// Seed 1000 rows, run 10 writers until the trigger, drain, verify
/// Expected: final count is exactly 1000 + acknowledged inserts
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_writers_1000_rows() {
    init_tracing();

    let (config, _dir) = sqlite_config(Scenario::ParallelWriters, 1000);
    let prepared = setup::prepare(&config).await.expect("Failed to prepare store");

    let start = Instant::now();
    let report = Coordinator::new(prepared.store(), config.trigger.build(), &config)
        .run()
        .await
        .expect("Run failed");
    println!("Run finished in {:?}: {:?}", start.elapsed(), report);

    assert_eq!(report.parallelism, 10);
    assert_eq!(report.seed.inserted, 1000);
    assert_eq!(report.baseline, 1000);
    assert!(report.workers.successes > 0, "Writers made no progress");
    assert_eq!(report.expected, 1000 + report.workers.successes);
    assert_eq!(report.actual, report.expected);
    assert_eq!(report.verdict, Verdict::Consistent);

    prepared.teardown(false).await.unwrap();
}

/// Seed 1000 rows and run one reader
/// Expected: no read ever returns anything but 1000
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_single_reader_sees_baseline() {
    init_tracing();

    let (config, _dir) = sqlite_config(Scenario::SingleReader, 1000);
    let prepared = setup::prepare(&config).await.expect("Failed to prepare store");

    let report = Coordinator::new(prepared.store(), config.trigger.build(), &config)
        .run()
        .await
        .expect("Run failed");

    assert_eq!(report.parallelism, 1);
    assert!(report.workers.iterations > 0, "Reader never ran");
    assert_eq!(report.workers.mismatches, 0);
    assert_eq!(report.workers.failures, 0);
    assert_eq!(report.expected, 1000);
    assert_eq!(report.actual, 1000);
    assert!(report.verdict.is_consistent());

    prepared.teardown(false).await.unwrap();
}

/// One reader per pool connection
/// Expected: same as a single reader, with more reads
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_readers_sees_baseline() {
    init_tracing();

    let (mut config, _dir) = sqlite_config(Scenario::ParallelReaders, 200);
    config.max_connections = 4;
    let prepared = setup::prepare(&config).await.expect("Failed to prepare store");

    let report = Coordinator::new(prepared.store(), config.trigger.build(), &config)
        .run()
        .await
        .expect("Run failed");

    assert_eq!(report.parallelism, 4);
    assert!(report.workers.iterations >= 4);
    assert_eq!(report.workers.mismatches, 0);
    assert_eq!(report.actual, 200);
    assert!(report.verdict.is_consistent());

    prepared.teardown(false).await.unwrap();
}

/// Scenario 1: no traffic at all, only the failover
/// Expected: seeded rows are all still there
#[tokio::test]
async fn test_drop_leader_without_traffic() {
    init_tracing();

    let (mut config, _dir) = sqlite_config(Scenario::DropLeader, 50);
    config.trigger = TriggerMode::After(Duration::from_millis(10));
    let prepared = setup::prepare(&config).await.expect("Failed to prepare store");

    let report = Coordinator::new(prepared.store(), config.trigger.build(), &config)
        .run()
        .await
        .expect("Run failed");

    assert_eq!(report.parallelism, 0);
    assert_eq!(report.workers.iterations, 0);
    assert_eq!(report.baseline, 50);
    assert_eq!(report.actual, 50);
    assert!(report.verdict.is_consistent());

    prepared.teardown(false).await.unwrap();
}

/// Writers keep going while every insert is rejected, then recover
/// Expected: rejected inserts counted as failures, never added to the expected count
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_writers_survive_rejection_window() {
    init_tracing();

    let store = Arc::new(MemoryStore::with_latency(Duration::from_millis(1)));
    let config = memory_config(Scenario::ParallelWriters, 100, 8);
    let trigger = StoreGateTrigger::new(store.clone(), 400).with_window(
        |s| s.set_insert_fault(InsertFault::Reject),
        |s| s.set_insert_fault(InsertFault::None),
    );

    let report = Coordinator::new(store.clone(), Box::new(trigger), &config)
        .run()
        .await
        .expect("Run failed");

    assert!(report.workers.failures > 0, "No insert was rejected");
    assert_eq!(report.workers.connection_errors, report.workers.failures);
    assert_eq!(
        report.workers.iterations,
        report.workers.successes + report.workers.failures
    );
    assert_eq!(report.expected, 100 + report.workers.successes);
    assert_eq!(report.actual, store.len() as u64);
    assert!(report.verdict.is_consistent());
}

/// Readers keep going while every read fails
/// Expected: failed reads counted, no mismatches, run consistent
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_readers_survive_outage() {
    init_tracing();

    let store = Arc::new(MemoryStore::with_latency(Duration::from_millis(1)));
    let config = memory_config(Scenario::ParallelReaders, 100, 4);
    let trigger = StoreGateTrigger::new(store.clone(), 200)
        .with_window(|s| s.set_fail_reads(true), |s| s.set_fail_reads(false));

    let report = Coordinator::new(store.clone(), Box::new(trigger), &config)
        .run()
        .await
        .expect("Run failed");

    assert!(report.workers.failures > 0, "No read failed");
    assert_eq!(report.workers.connection_errors, report.workers.failures);
    assert_eq!(report.workers.mismatches, 0);
    assert_eq!(report.actual, 100);
    assert!(report.verdict.is_consistent());
}

/// Every insert commits but its acknowledgement is lost
/// Expected: the store holds more rows than were acknowledged
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_lost_ack_reported_as_extra_rows() {
    init_tracing();

    let store = Arc::new(MemoryStore::with_latency(Duration::from_millis(1)));
    let config = memory_config(Scenario::SingleWriter, 10, 2);
    let trigger = StoreGateTrigger::new(store.clone(), 20).with_window(
        |s| s.set_insert_fault(InsertFault::AckLost),
        |s| s.set_insert_fault(InsertFault::None),
    );

    let report = Coordinator::new(store.clone(), Box::new(trigger), &config)
        .run()
        .await
        .expect("Run failed");

    assert!(report.workers.failures > 0);
    assert!(report.actual > report.expected);
    assert_eq!(
        report.verdict,
        Verdict::ExtraRows {
            expected: report.expected,
            actual: report.actual
        }
    );
}

/// Every insert is acknowledged but never stored
/// Expected: the store holds fewer rows than were acknowledged
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_dropped_write_reported_as_missing_rows() {
    init_tracing();

    let store = Arc::new(MemoryStore::with_latency(Duration::from_millis(1)));
    let config = memory_config(Scenario::ParallelWriters, 10, 3);
    let trigger = StoreGateTrigger::new(store.clone(), 30).with_window(
        |s| s.set_insert_fault(InsertFault::Drop),
        |s| s.set_insert_fault(InsertFault::None),
    );

    let report = Coordinator::new(store.clone(), Box::new(trigger), &config)
        .run()
        .await
        .expect("Run failed");

    assert!(matches!(report.verdict, Verdict::MissingRows { .. }));
    assert!(report.actual < report.expected);
    assert!(!report.verdict.is_consistent());
}

/// Reads report a row no writer inserted, then recover before verify
/// Expected: final count matches, run still fails on the mismatched reads
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_phantom_rows_fail_readers() {
    init_tracing();

    let store = Arc::new(MemoryStore::with_latency(Duration::from_millis(1)));
    let config = memory_config(Scenario::SingleReader, 25, 1);
    let trigger = StoreGateTrigger::new(store.clone(), 10)
        .with_window(|s| s.set_phantom_rows(1), |s| s.set_phantom_rows(0));

    let report = Coordinator::new(store.clone(), Box::new(trigger), &config)
        .run()
        .await
        .expect("Run failed");

    assert_eq!(report.actual, 25);
    assert!(report.workers.mismatches > 0);
    assert_eq!(
        report.verdict,
        Verdict::ReadMismatches {
            count: report.workers.mismatches
        }
    );
}

/// Slow operations are still in flight when stop fires
/// Expected: run returns only after every operation completed; each worker
/// starts at most one operation after stop
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_drain_waits_for_in_flight_operations() {
    init_tracing();

    let workers = 6;
    let store = Arc::new(MemoryStore::with_latency(Duration::from_millis(50)));
    let config = memory_config(Scenario::ParallelWriters, 0, workers);
    let trigger =
        StoreGateTrigger::new(store.clone(), 30).with_window(|_| {}, |s| s.mark_stopped());

    let report = Coordinator::new(store.clone(), Box::new(trigger), &config)
        .run()
        .await
        .expect("Run failed");

    assert_eq!(store.in_flight.load(Ordering::SeqCst), 0);
    assert!(store.max_in_flight.load(Ordering::SeqCst) >= 2);
    assert!(
        store.started_after_stop.load(Ordering::SeqCst) <= workers as u64 + 1,
        "Workers kept starting operations after stop"
    );
    assert_eq!(report.expected, report.workers.successes);
    assert_eq!(report.actual, report.expected);
    assert!(report.verdict.is_consistent());
}
