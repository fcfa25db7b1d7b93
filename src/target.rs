//! Target expansion: CIDR blocks into individual host addresses
//!
//! A run targets either a single address or every host in a CIDR block.
//! Expansion happens before anything is queued, so a malformed block
//! aborts the run without issuing a single query.

use crate::check::CheckError;
use ipnet::Ipv4Net;
use std::net::Ipv4Addr;

/// Parse a CIDR block string such as `192.0.2.0/28`.
///
/// # Errors
///
/// Returns [`CheckError::InvalidCidr`] if the string is not a valid IPv4
/// CIDR block.
pub fn parse_cidr(input: &str) -> Result<Ipv4Net, CheckError> {
    input.parse::<Ipv4Net>().map_err(|e| CheckError::InvalidCidr {
        input: input.to_string(),
        reason: e.to_string(),
    })
}

/// Enumerate the host addresses of a block in ascending order.
///
/// Network and broadcast addresses are excluded for prefixes shorter than
/// /31; /31 and /32 blocks yield all of their addresses.
pub fn expand_hosts(network: &Ipv4Net) -> Vec<Ipv4Addr> {
    network.hosts().collect()
}
