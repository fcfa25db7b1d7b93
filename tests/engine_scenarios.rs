//! Engine integration tests against a scripted resolver
//!
//! Every scenario runs the real engine end to end; only the DNS client is
//! replaced, through the same seam the production UDP client plugs into.

#![allow(clippy::unwrap_used)]

use async_trait::async_trait;
use rblscan::dns::ResponseCode;
use rblscan::{
    target, CheckConfig, CheckEngine, CheckResult, DnsClient, DnsResponse, ResultSink,
    TransportError,
};
use std::collections::{HashMap, VecDeque};
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// One scripted resolver outcome for a query name.
#[derive(Clone)]
enum Outcome {
    /// Answer with this response code and these A records
    Respond(ResponseCode, Vec<Ipv4Addr>),
    /// Fail at the transport level
    Fail,
}

/// DNS client that replays scripted outcomes per query name.
///
/// The outcomes for a name are consumed in order; the last one repeats.
/// Unscripted names answer success with no records ("not listed").
#[derive(Default)]
struct ScriptedClient {
    scripts: Mutex<HashMap<String, VecDeque<Outcome>>>,
    calls: AtomicUsize,
}

impl ScriptedClient {
    fn new() -> Self {
        Self::default()
    }

    fn script(self, name: &str, outcomes: Vec<Outcome>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(name.to_string(), outcomes.into());
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DnsClient for ScriptedClient {
    async fn query_a(&self, name: &str) -> Result<DnsResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let outcome = {
            let mut scripts = self.scripts.lock().unwrap();
            match scripts.get_mut(name) {
                Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
                Some(queue) => queue.front().cloned().unwrap(),
                None => Outcome::Respond(ResponseCode::NoError, vec![]),
            }
        };
        match outcome {
            Outcome::Respond(code, answers) => Ok(DnsResponse { code, answers }),
            Outcome::Fail => Err(TransportError::Timeout(Duration::from_millis(1))),
        }
    }
}

/// Sink that stores every reported result.
#[derive(Default)]
struct CollectSink {
    results: Mutex<Vec<CheckResult>>,
}

impl CollectSink {
    fn collected(&self) -> Vec<CheckResult> {
        self.results.lock().unwrap().clone()
    }
}

impl ResultSink for CollectSink {
    fn report(&self, result: &CheckResult) {
        self.results.lock().unwrap().push(result.clone());
    }
}

fn config_with_zones(zones: &[&str]) -> CheckConfig {
    CheckConfig::builder()
        .zones(zones.iter().map(|z| (*z).to_string()).collect())
        .queue_size(4)
        .build()
        .unwrap()
}

async fn run_bounded(
    engine: &CheckEngine,
    addresses: &[Ipv4Addr],
    sink: Arc<CollectSink>,
) -> rblscan::CheckSummary {
    tokio::time::timeout(Duration::from_secs(5), engine.run(addresses, sink))
        .await
        .expect("run should terminate")
}

#[tokio::test]
async fn test_single_address_single_zone_clean_run_prints_nothing() {
    let client = Arc::new(ScriptedClient::new());
    let engine = CheckEngine::with_client(config_with_zones(&["bl.example.org"]), client.clone());
    let sink = Arc::new(CollectSink::default());

    let summary = run_bounded(&engine, &[Ipv4Addr::new(1, 2, 3, 4)], sink.clone()).await;

    assert!(sink.collected().is_empty());
    assert_eq!(summary.tasks, 1);
    assert_eq!(summary.attempts, 1);
    assert_eq!(summary.clean, 1);
    assert_eq!(summary.listed, 0);
    assert_eq!(client.calls(), 1);
}

#[tokio::test]
async fn test_listed_zone_reports_exactly_once() {
    let client = Arc::new(ScriptedClient::new().script(
        "4.3.2.1.a.example.org.",
        vec![Outcome::Respond(
            ResponseCode::NoError,
            vec![Ipv4Addr::new(127, 0, 0, 2)],
        )],
    ));
    let engine = CheckEngine::with_client(
        config_with_zones(&["a.example.org", "b.example.org"]),
        client,
    );
    let sink = Arc::new(CollectSink::default());

    let summary = run_bounded(&engine, &[Ipv4Addr::new(1, 2, 3, 4)], sink.clone()).await;

    let results = sink.collected();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].zone, "a.example.org");
    assert_eq!(results[0].matches, vec![Ipv4Addr::new(127, 0, 0, 2)]);
    assert_eq!(
        results[0].report_line(),
        "1.2.3.4 blacklisted on a.example.org with 127.0.0.2"
    );
    assert_eq!(summary.listed, 1);
    assert_eq!(summary.clean, 1);
}

#[tokio::test]
async fn test_every_task_resolves_exactly_once() {
    // a clean run over a /30 x 2 zones: decrements must balance the
    // tasks created, which is observable as the run returning with
    // attempts == tasks
    let network = target::parse_cidr("10.0.0.0/30").unwrap();
    let addresses = target::expand_hosts(&network);
    assert_eq!(addresses.len(), 2);

    let client = Arc::new(ScriptedClient::new());
    let engine = CheckEngine::with_client(
        config_with_zones(&["a.example.org", "b.example.org"]),
        client.clone(),
    );
    let sink = Arc::new(CollectSink::default());

    let summary = run_bounded(&engine, &addresses, sink).await;

    assert_eq!(summary.tasks, 4);
    assert_eq!(summary.attempts, 4);
    assert_eq!(summary.clean, 4);
    assert_eq!(client.calls(), 4);
}

#[tokio::test]
async fn test_transport_errors_requeue_until_retry_limit() {
    let client = Arc::new(
        ScriptedClient::new().script("4.3.2.1.bl.example.org.", vec![Outcome::Fail]),
    );
    let config = CheckConfig::builder()
        .zones(vec!["bl.example.org".to_string()])
        .retry_limit(3)
        .build()
        .unwrap();
    let engine = CheckEngine::with_client(config, client.clone());
    let sink = Arc::new(CollectSink::default());

    let summary = run_bounded(&engine, &[Ipv4Addr::new(1, 2, 3, 4)], sink.clone()).await;

    // initial attempt plus three retries, then the pair is abandoned
    assert_eq!(client.calls(), 4);
    assert_eq!(summary.attempts, 4);
    assert_eq!(summary.retried, 3);
    assert_eq!(summary.abandoned, 1);
    assert!(sink.collected().is_empty());
}

#[tokio::test]
async fn test_error_response_code_drops_pair_silently() {
    let client = Arc::new(ScriptedClient::new().script(
        "4.3.2.1.bl.example.org.",
        vec![Outcome::Respond(ResponseCode::ServFail, vec![])],
    ));
    let engine = CheckEngine::with_client(config_with_zones(&["bl.example.org"]), client.clone());
    let sink = Arc::new(CollectSink::default());

    let summary = run_bounded(&engine, &[Ipv4Addr::new(1, 2, 3, 4)], sink.clone()).await;

    // dropped, not retried, not reported
    assert_eq!(client.calls(), 1);
    assert_eq!(summary.dropped, 1);
    assert_eq!(summary.retried, 0);
    assert!(sink.collected().is_empty());
}

#[tokio::test]
async fn test_transient_failure_recovers_and_reports() {
    let client = Arc::new(ScriptedClient::new().script(
        "4.3.2.1.bl.example.org.",
        vec![
            Outcome::Fail,
            Outcome::Fail,
            Outcome::Respond(ResponseCode::NoError, vec![Ipv4Addr::new(127, 0, 0, 4)]),
        ],
    ));
    let engine = CheckEngine::with_client(config_with_zones(&["bl.example.org"]), client.clone());
    let sink = Arc::new(CollectSink::default());

    let summary = run_bounded(&engine, &[Ipv4Addr::new(1, 2, 3, 4)], sink.clone()).await;

    assert_eq!(client.calls(), 3);
    assert_eq!(summary.retried, 2);
    assert_eq!(summary.listed, 1);
    let results = sink.collected();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].matches, vec![Ipv4Addr::new(127, 0, 0, 4)]);
}

#[tokio::test]
async fn test_cancellation_token_bounds_an_unbounded_retry_loop() {
    // no retry limit: this pair would otherwise cycle forever
    let client = Arc::new(
        ScriptedClient::new().script("4.3.2.1.bl.example.org.", vec![Outcome::Fail]),
    );
    let token = CancellationToken::new();
    let config = CheckConfig::builder()
        .zones(vec!["bl.example.org".to_string()])
        .cancel(token.clone())
        .build()
        .unwrap();
    let engine = CheckEngine::with_client(config, client);
    let sink = Arc::new(CollectSink::default());

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        token.cancel();
    });

    let summary = run_bounded(&engine, &[Ipv4Addr::new(1, 2, 3, 4)], sink).await;
    canceller.await.unwrap();

    assert!(summary.cancelled);
    assert!(summary.retried > 0, "the pair should have been re-enqueued");
}

#[tokio::test]
async fn test_empty_target_set_completes_immediately() {
    let client = Arc::new(ScriptedClient::new());
    let engine = CheckEngine::with_client(config_with_zones(&["bl.example.org"]), client.clone());
    let sink = Arc::new(CollectSink::default());

    let summary = run_bounded(&engine, &[], sink).await;

    assert_eq!(summary.tasks, 0);
    assert_eq!(client.calls(), 0);
}

#[test]
fn test_invalid_cidr_queues_nothing() {
    let err = target::parse_cidr("10.0.0.0/999").unwrap_err();
    assert!(matches!(err, rblscan::CheckError::InvalidCidr { .. }));
}
