//! Concurrent check engine: work queue, dispatcher, and retry loop
//!
//! The engine expands a target set against the configured blacklist zones
//! and runs the lookups through a bounded work queue. One dispatcher loop
//! launches a lookup task per queued pair and collects completed results;
//! transport failures re-enqueue a replacement attempt for the same pair.
//! The run terminates when the completion tracker reaches zero. With the
//! default unbounded retry policy that is not guaranteed: a persistently
//! unreachable resolver keeps its pairs cycling forever. Set a retry
//! limit to bound the run.

use super::config::CheckConfig;
use super::report::ResultSink;
use super::tracker::CompletionTracker;
use super::types::{CheckResult, CheckSummary, CheckTask};
use crate::dns::{DnsClient, UdpDnsClient};
use crate::encode;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Per-run counters, shared across lookup tasks and the dispatcher.
#[derive(Debug, Default)]
struct RunCounters {
    attempts: AtomicUsize,
    listed: AtomicUsize,
    clean: AtomicUsize,
    dropped: AtomicUsize,
    retried: AtomicUsize,
    abandoned: AtomicUsize,
}

impl RunCounters {
    fn bump(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::SeqCst);
    }

    fn read(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

/// Everything one lookup attempt needs, cloned per spawned task.
#[derive(Clone)]
struct LookupContext {
    client: Arc<dyn DnsClient>,
    work_tx: mpsc::Sender<CheckTask>,
    result_tx: mpsc::Sender<CheckResult>,
    tracker: Arc<CompletionTracker>,
    counters: Arc<RunCounters>,
    retry_limit: Option<u32>,
    retry_backoff: Option<Duration>,
}

/// Blacklist check engine
pub struct CheckEngine {
    config: CheckConfig,
    client: Arc<dyn DnsClient>,
}

impl CheckEngine {
    /// Create an engine that queries the configured resolver over UDP.
    pub fn new(config: CheckConfig) -> Self {
        let client = Arc::new(
            UdpDnsClient::new(config.nameserver).with_timeout(config.query_timeout),
        );
        Self { config, client }
    }

    /// Create an engine with an injected DNS client.
    pub fn with_client(config: CheckConfig, client: Arc<dyn DnsClient>) -> Self {
        Self { config, client }
    }

    /// Check every address against every configured zone, reporting listed
    /// results through `sink`, and return the run's counters.
    ///
    /// Suspends until all outstanding attempts have terminally resolved,
    /// or until the boundary cancellation token (if configured) fires.
    pub async fn run(&self, addresses: &[Ipv4Addr], sink: Arc<dyn ResultSink>) -> CheckSummary {
        let total = addresses.len() * self.config.zones.len();
        let counters = Arc::new(RunCounters::default());
        if total == 0 {
            return Self::summary(total, &counters, false);
        }

        let tracker = Arc::new(CompletionTracker::new());
        // account for every pair before the first one is emitted, so an
        // empty queue early in the run cannot read as completion
        tracker.add(total);

        let (work_tx, work_rx) = mpsc::channel::<CheckTask>(self.config.queue_size);
        let (result_tx, result_rx) = mpsc::channel::<CheckResult>(1);
        let shutdown = CancellationToken::new();

        let producer = tokio::spawn(produce(
            work_tx.clone(),
            addresses.to_vec(),
            self.config.zones.clone(),
            shutdown.clone(),
        ));

        let context = LookupContext {
            client: Arc::clone(&self.client),
            work_tx,
            result_tx,
            tracker: Arc::clone(&tracker),
            counters: Arc::clone(&counters),
            retry_limit: self.config.retry_limit,
            retry_backoff: self.config.retry_backoff,
        };
        let dispatcher = tokio::spawn(dispatch(
            work_rx,
            result_rx,
            context,
            Arc::clone(&sink),
            shutdown.clone(),
        ));

        let cancelled = match &self.config.cancel {
            Some(token) => {
                tokio::select! {
                    () = tracker.wait() => false,
                    () = token.cancelled() => true,
                }
            }
            None => {
                tracker.wait().await;
                false
            }
        };

        shutdown.cancel();
        let _ = producer.await;
        let _ = dispatcher.await;

        Self::summary(total, &counters, cancelled)
    }

    fn summary(tasks: usize, counters: &RunCounters, cancelled: bool) -> CheckSummary {
        CheckSummary {
            tasks,
            attempts: RunCounters::read(&counters.attempts),
            listed: RunCounters::read(&counters.listed),
            clean: RunCounters::read(&counters.clean),
            dropped: RunCounters::read(&counters.dropped),
            retried: RunCounters::read(&counters.retried),
            abandoned: RunCounters::read(&counters.abandoned),
            cancelled,
        }
    }
}

/// Emit one task per (address, zone) pair into the work queue.
///
/// Suspends whenever the queue is full; this is the system's only
/// backpressure.
async fn produce(
    work_tx: mpsc::Sender<CheckTask>,
    addresses: Vec<Ipv4Addr>,
    zones: Vec<String>,
    shutdown: CancellationToken,
) {
    for address in addresses {
        for zone in &zones {
            let task = CheckTask::new(address, zone.clone());
            tokio::select! {
                sent = work_tx.send(task) => {
                    if sent.is_err() {
                        return;
                    }
                }
                () = shutdown.cancelled() => return,
            }
        }
    }
}

/// The single control loop: launch a lookup per queued task, collect and
/// report completed results.
async fn dispatch(
    mut work_rx: mpsc::Receiver<CheckTask>,
    mut result_rx: mpsc::Receiver<CheckResult>,
    context: LookupContext,
    sink: Arc<dyn ResultSink>,
    shutdown: CancellationToken,
) {
    loop {
        tokio::select! {
            Some(task) = work_rx.recv() => {
                tokio::spawn(run_lookup(task, context.clone()));
            }
            Some(result) = result_rx.recv() => {
                deliver(&result, sink.as_ref(), &context.counters);
            }
            () = shutdown.cancelled() => break,
        }
    }
    // by the time the tracker reads zero every attempt has finished its
    // send, so anything still buffered is delivered before the loop exits
    while let Ok(result) = result_rx.try_recv() {
        deliver(&result, sink.as_ref(), &context.counters);
    }
}

fn deliver(result: &CheckResult, sink: &dyn ResultSink, counters: &RunCounters) {
    if result.is_listed() {
        RunCounters::bump(&counters.listed);
        sink.report(result);
    } else {
        RunCounters::bump(&counters.clean);
    }
}

/// One lookup attempt: exactly one DNS query, exactly one terminal action.
async fn run_lookup(task: CheckTask, context: LookupContext) {
    RunCounters::bump(&context.counters.attempts);
    let query_name = encode::query_name(task.address, &task.zone);
    debug!(%query_name, "checking");

    match context.client.query_a(&query_name).await {
        Err(err) => {
            debug!(address = %task.address, zone = %task.zone, %query_name, %err, "query failed");
            retry_or_abandon(task, context).await;
        }
        Ok(response) if !response.is_success() => {
            // "treat as unknown, not as listed": dropped without retry
            // and without a result
            debug!(%query_name, code = %response.code, "error response code, dropping");
            RunCounters::bump(&context.counters.dropped);
            context.tracker.done();
        }
        Ok(response) => {
            debug!(%query_name, answers = response.answers.len(), "query succeeded");
            let result = CheckResult {
                address: task.address,
                zone: task.zone,
                query_name,
                matches: response.answers,
            };
            // the attempt resolves only once the dispatcher has taken the
            // result off the channel
            let _ = context.result_tx.send(result).await;
            context.tracker.done();
        }
    }
}

/// Fold a transport failure into a replacement attempt, or abandon the
/// pair once the configured limit is exhausted.
async fn retry_or_abandon(task: CheckTask, context: LookupContext) {
    if let Some(limit) = context.retry_limit {
        if task.attempt >= limit {
            warn!(
                address = %task.address,
                zone = %task.zone,
                attempts = task.attempt + 1,
                "abandoning pair after retry limit"
            );
            RunCounters::bump(&context.counters.abandoned);
            context.tracker.done();
            return;
        }
    }

    if let Some(base) = context.retry_backoff {
        tokio::time::sleep(backoff_delay(base, task.attempt)).await;
    }

    RunCounters::bump(&context.counters.retried);
    // the replacement is accounted for before this attempt resolves, so
    // the tracker cannot transiently read zero
    context.tracker.add(1);
    if context.work_tx.send(task.retry()).await.is_err() {
        // engine is shutting down and the replacement will never run
        context.tracker.done();
    }
    context.tracker.done();
}

fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(1u32 << attempt.min(10))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_delay_doubles_and_saturates() {
        let base = Duration::from_millis(10);
        assert_eq!(backoff_delay(base, 0), Duration::from_millis(10));
        assert_eq!(backoff_delay(base, 1), Duration::from_millis(20));
        assert_eq!(backoff_delay(base, 3), Duration::from_millis(80));
        // attempts past the cap stop growing
        assert_eq!(backoff_delay(base, 10), backoff_delay(base, 40));
    }
}
