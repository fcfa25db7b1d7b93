//! Reporting seam for positive check results
//!
//! The dispatcher owns the reporting policy: listed results reach the
//! sink, clean ones are discarded silently. The sink owns the medium.

use super::types::CheckResult;

/// Consumes listed results as the dispatcher collects them.
pub trait ResultSink: Send + Sync {
    /// Called once per listed result, in collection order.
    fn report(&self, result: &CheckResult);
}

/// Sink that prints one report line per listed result to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrintSink;

impl ResultSink for PrintSink {
    fn report(&self, result: &CheckResult) {
        println!("{}", result.report_line());
    }
}
