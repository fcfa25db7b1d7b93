//! Outstanding-work counter gating run termination

use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

/// Counts check attempts that have been created but not yet terminally
/// resolved.
///
/// Every attempt creation calls [`add`](Self::add) exactly once and every
/// terminal resolution calls [`done`](Self::done) exactly once. A retry
/// must `add` its replacement attempt *before* the failed attempt calls
/// `done`, so the count can never transiently read zero while work
/// remains. [`wait`](Self::wait) resolves once the count reaches zero.
#[derive(Debug, Default)]
pub struct CompletionTracker {
    outstanding: AtomicUsize,
    zero: Notify,
}

impl CompletionTracker {
    /// New tracker with no outstanding work.
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for `n` newly created attempts.
    pub fn add(&self, n: usize) {
        self.outstanding.fetch_add(n, Ordering::SeqCst);
    }

    /// Resolve one attempt. Wakes waiters when the count hits zero.
    pub fn done(&self) {
        let previous = self.outstanding.fetch_sub(1, Ordering::SeqCst);
        debug_assert!(previous > 0, "completion tracker underflow");
        if previous == 1 {
            self.zero.notify_waiters();
        }
    }

    /// Attempts currently outstanding.
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }

    /// Suspend until the count reaches zero.
    ///
    /// Returns immediately if it already is.
    pub async fn wait(&self) {
        loop {
            // register interest before re-checking, so a done() racing
            // with us cannot notify between the check and the await
            let notified = self.zero.notified();
            if self.outstanding.load(Ordering::SeqCst) == 0 {
                return;
            }
            notified.await;
        }
    }
}
