//! rblscan - a concurrent DNS blacklist (DNSBL) checker
//!
//! This library checks whether IPv4 addresses are listed on DNS-based
//! blacklists by issuing reverse-label A queries (`4.3.2.1.<zone>.`)
//! against a configured resolver, fanning the (address, zone) pairs out
//! through a bounded work queue.

pub mod check;
pub mod dns;
pub mod encode;
pub mod target;
pub mod zones;

// Re-export core types for library users
pub use check::{
    CheckConfig, CheckConfigBuilder, CheckEngine, CheckError, CheckResult, CheckSummary,
    CheckTask, CompletionTracker, PrintSink, ResultSink,
};
pub use dns::{DnsClient, DnsResponse, TransportError, UdpDnsClient};
