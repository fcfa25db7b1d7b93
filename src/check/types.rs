//! Core types for blacklist check runs

use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

/// One pending (address, blacklist zone) pair awaiting a DNS lookup.
///
/// A task is fully determined by its pair; `attempt` only records how many
/// prior attempts for the pair failed at the transport level. The dispatch
/// loop re-emits a pair only after its previous attempt has terminated, so
/// the same pair is never in flight twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckTask {
    /// The IP being checked
    pub address: Ipv4Addr,
    /// The DNSBL zone it is checked against
    pub zone: String,
    /// Zero-based attempt counter, bumped on each retry
    pub attempt: u32,
}

impl CheckTask {
    /// Create the initial task for a pair.
    pub fn new(address: Ipv4Addr, zone: impl Into<String>) -> Self {
        Self {
            address,
            zone: zone.into(),
            attempt: 0,
        }
    }

    /// The replacement task queued after a transport failure.
    pub fn retry(&self) -> Self {
        Self {
            address: self.address,
            zone: self.zone.clone(),
            attempt: self.attempt + 1,
        }
    }
}

/// The outcome of one completed lookup attempt.
///
/// Only successful resolver exchanges produce a result; transport
/// failures re-enqueue and error response codes are dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    /// The IP that was checked
    pub address: Ipv4Addr,
    /// The DNSBL zone it was checked against
    pub zone: String,
    /// The fully-qualified name that was queried
    pub query_name: String,
    /// Returned A-record values, in response order; empty means not listed
    pub matches: Vec<Ipv4Addr>,
}

impl CheckResult {
    /// Whether the zone lists the address.
    pub fn is_listed(&self) -> bool {
        !self.matches.is_empty()
    }

    /// The one-line report for a listed address.
    pub fn report_line(&self) -> String {
        let values = self
            .matches
            .iter()
            .map(|addr| addr.to_string())
            .collect::<Vec<_>>()
            .join(",");
        format!("{} blacklisted on {} with {}", self.address, self.zone, values)
    }
}

/// Counters describing a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckSummary {
    /// Pairs created by the producer (addresses × zones)
    pub tasks: usize,
    /// Lookup attempts issued, including retries
    pub attempts: usize,
    /// Results with at least one match
    pub listed: usize,
    /// Results with no matches
    pub clean: usize,
    /// Attempts dropped on an error response code
    pub dropped: usize,
    /// Replacement attempts queued after transport failures
    pub retried: usize,
    /// Pairs abandoned after exhausting the retry limit
    pub abandoned: usize,
    /// Whether the run was stopped by the boundary cancellation token
    pub cancelled: bool,
}
