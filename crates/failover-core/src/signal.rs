//! One-shot stop broadcast and the shared expected row count

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// Sending half of the stop broadcast, owned by the coordinator
///
/// Firing consumes the signal, so it can fire at most once. Dropping it
/// without firing fires it too, which keeps an aborted run from leaving
/// workers looping forever.
#[derive(Debug)]
pub struct StopSignal {
    tx: watch::Sender<bool>,
}

/// Receiving half of the stop broadcast, one clone per worker
#[derive(Debug, Clone)]
pub struct StopListener {
    rx: watch::Receiver<bool>,
}

impl StopSignal {
    /// Create an unfired signal and its first listener
    pub fn new() -> (Self, StopListener) {
        let (tx, rx) = watch::channel(false);
        (Self { tx }, StopListener { rx })
    }

    /// Broadcast stop to every listener
    pub fn fire(self) {
        drop(self);
    }
}

impl Drop for StopSignal {
    fn drop(&mut self) {
        self.tx.send_replace(true);
    }
}

impl StopListener {
    /// Non-blocking poll, checked before each worker iteration
    pub fn is_fired(&self) -> bool {
        *self.rx.borrow()
    }
}

/// Number of rows the store should hold once traffic has drained
///
/// Cloning shares the same counter.
#[derive(Debug, Clone, Default)]
pub struct ExpectedCount {
    inner: Arc<AtomicU64>,
}

impl ExpectedCount {
    pub fn new(baseline: u64) -> Self {
        Self {
            inner: Arc::new(AtomicU64::new(baseline)),
        }
    }

    /// Record one acknowledged insert
    pub fn increment(&self) -> u64 {
        self.inner.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn load(&self) -> u64 {
        self.inner.load(Ordering::SeqCst)
    }
}
