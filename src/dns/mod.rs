//! DNS resolver boundary for blacklist lookups

pub mod client;

pub use client::{DnsClient, DnsResponse, TransportError, UdpDnsClient};

// Re-exported so DnsClient implementations outside this crate can build
// responses without depending on hickory-proto directly.
pub use hickory_proto::op::ResponseCode;
