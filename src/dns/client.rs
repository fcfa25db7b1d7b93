//! One-shot DNS A queries against a fixed resolver endpoint
//!
//! The check engine treats DNS as a black box: hand it a fully-qualified
//! name, get back a response code plus zero or more A answers, or a
//! transport-level error. [`DnsClient`] is that seam; [`UdpDnsClient`] is
//! the production implementation, one UDP exchange per query with
//! recursion requested.

use async_trait::async_trait;
use hickory_proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::{DNSClass, Name, RData, RecordType};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use std::net::{Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use tokio::net::UdpSocket;

/// Default wait for a resolver response before the attempt counts as a
/// transport failure.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Error type for failures on the way to or from the resolver.
///
/// Every variant is recoverable by retrying the same query; response
/// *status* problems are not errors here but part of [`DnsResponse`].
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// No response arrived within the query timeout
    #[error("query timed out after {0:?}")]
    Timeout(Duration),

    /// Socket-level failure (bind, connect, send, receive)
    #[error("network error: {0}")]
    Io(#[from] std::io::Error),

    /// The query could not be built or the response could not be parsed
    #[error("malformed DNS message: {0}")]
    Malformed(String),
}

/// What the resolver answered: a status code and any A records.
#[derive(Debug, Clone)]
pub struct DnsResponse {
    /// DNS response code; anything but `NoError` means the lookup did not
    /// produce a usable answer
    pub code: ResponseCode,
    /// A-record values from the answer section, in response order
    pub answers: Vec<Ipv4Addr>,
}

impl DnsResponse {
    /// True when the resolver answered successfully (with or without
    /// records).
    pub fn is_success(&self) -> bool {
        self.code == ResponseCode::NoError
    }
}

/// Resolve an A record for a fully-qualified name.
#[async_trait]
pub trait DnsClient: Send + Sync {
    /// Issue one query for `name` and classify the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the resolver could not be reached
    /// or its response was unusable at the wire level.
    async fn query_a(&self, name: &str) -> Result<DnsResponse, TransportError>;
}

/// DNS client that sends each query as a single UDP datagram to one
/// configured resolver.
#[derive(Debug, Clone)]
pub struct UdpDnsClient {
    server: SocketAddr,
    timeout: Duration,
}

impl UdpDnsClient {
    /// Create a client for the given resolver endpoint with the default
    /// query timeout.
    pub fn new(server: SocketAddr) -> Self {
        Self {
            server,
            timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    /// Override the per-query timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The resolver endpoint this client queries.
    pub fn server(&self) -> SocketAddr {
        self.server
    }
}

#[async_trait]
impl DnsClient for UdpDnsClient {
    async fn query_a(&self, name: &str) -> Result<DnsResponse, TransportError> {
        let (id, request) = build_a_query(name)?;

        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        socket.connect(self.server).await?;
        socket.send(&request).await?;

        let mut buf = vec![0u8; 4096];
        let len = tokio::time::timeout(self.timeout, socket.recv(&mut buf))
            .await
            .map_err(|_| TransportError::Timeout(self.timeout))??;

        parse_a_response(id, &buf[..len])
    }
}

/// Build the wire bytes for one recursive A query and return them with the
/// message ID used for response matching.
fn build_a_query(name: &str) -> Result<(u16, Vec<u8>), TransportError> {
    let name = Name::from_str(name)
        .map_err(|e| TransportError::Malformed(format!("invalid query name '{name}': {e}")))?;

    let mut query = Query::new();
    query.set_name(name);
    query.set_query_type(RecordType::A);
    query.set_query_class(DNSClass::IN);

    let id = rand::random::<u16>();
    let mut message = Message::new();
    message.set_id(id);
    message.set_message_type(MessageType::Query);
    message.set_op_code(OpCode::Query);
    message.set_recursion_desired(true);
    message.add_query(query);

    let mut buf = Vec::with_capacity(512);
    let mut encoder = BinEncoder::new(&mut buf);
    message
        .emit(&mut encoder)
        .map_err(|e| TransportError::Malformed(format!("failed to serialize query: {e}")))?;

    Ok((id, buf))
}

/// Parse a response, verify it belongs to our query, and pull out the A
/// answers.
fn parse_a_response(expected_id: u16, bytes: &[u8]) -> Result<DnsResponse, TransportError> {
    let message = Message::from_vec(bytes)
        .map_err(|e| TransportError::Malformed(format!("failed to parse response: {e}")))?;

    if message.id() != expected_id {
        return Err(TransportError::Malformed(format!(
            "response id {} does not match query id {}",
            message.id(),
            expected_id
        )));
    }

    let mut answers = Vec::new();
    for record in message.answers() {
        if let RData::A(a) = record.data() {
            answers.push(a.0);
        }
    }

    Ok(DnsResponse {
        code: message.response_code(),
        answers,
    })
}
