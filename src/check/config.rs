//! Configuration for a blacklist check run

use crate::check::CheckError;
use crate::zones;
use std::net::SocketAddr;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Default resolver endpoint when none is configured.
pub const DEFAULT_NAMESERVER: &str = "8.8.8.8:53";
/// Default bound on in-flight lookups.
pub const DEFAULT_QUEUE_SIZE: usize = 15;

/// Configuration for a check run
#[derive(Debug, Clone)]
pub struct CheckConfig {
    /// Resolver endpoint every lookup queries
    pub nameserver: SocketAddr,
    /// Work queue capacity; bounds in-flight lookups and provides the
    /// producer's backpressure
    pub queue_size: usize,
    /// Blacklist zones each address is checked against, in order
    pub zones: Vec<String>,
    /// Per-query resolver timeout
    pub query_timeout: Duration,
    /// Transport-failure retries allowed per pair before abandoning it.
    /// `None` retries forever, which matches the historical behavior and
    /// can keep a run from terminating against an unreachable resolver.
    pub retry_limit: Option<u32>,
    /// Base delay before a retry, doubled per attempt. `None` re-enqueues
    /// immediately (historical behavior).
    pub retry_backoff: Option<Duration>,
    /// Boundary cancellation: stops launching and reporting work when
    /// triggered. In-flight queries are not aborted.
    pub cancel: Option<CancellationToken>,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            // constant is known-good, parse cannot fail
            nameserver: DEFAULT_NAMESERVER.parse().expect("default nameserver"),
            queue_size: DEFAULT_QUEUE_SIZE,
            zones: zones::builtin_zones(),
            query_timeout: crate::dns::client::DEFAULT_QUERY_TIMEOUT,
            retry_limit: None,
            retry_backoff: None,
            cancel: None,
        }
    }
}

impl CheckConfig {
    /// Create a new CheckConfig builder
    pub fn builder() -> CheckConfigBuilder {
        CheckConfigBuilder::new()
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::Config`] when a field cannot support a run.
    pub fn validate(&self) -> Result<(), CheckError> {
        if self.queue_size == 0 {
            return Err(CheckError::Config(
                "queue size must be at least 1".to_string(),
            ));
        }
        if self.zones.is_empty() {
            return Err(CheckError::Config(
                "at least one blacklist zone is required".to_string(),
            ));
        }
        if self.query_timeout.is_zero() {
            return Err(CheckError::Config(
                "query timeout must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`CheckConfig`]
#[derive(Debug, Default)]
pub struct CheckConfigBuilder {
    config: CheckConfig,
}

impl CheckConfigBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            config: CheckConfig::default(),
        }
    }

    /// Set the resolver endpoint
    pub fn nameserver(mut self, nameserver: SocketAddr) -> Self {
        self.config.nameserver = nameserver;
        self
    }

    /// Set the work queue capacity
    pub fn queue_size(mut self, size: usize) -> Self {
        self.config.queue_size = size;
        self
    }

    /// Replace the blacklist zone list
    pub fn zones(mut self, zones: Vec<String>) -> Self {
        self.config.zones = zones;
        self
    }

    /// Set the per-query resolver timeout
    pub fn query_timeout(mut self, timeout: Duration) -> Self {
        self.config.query_timeout = timeout;
        self
    }

    /// Cap transport-failure retries per pair
    pub fn retry_limit(mut self, limit: u32) -> Self {
        self.config.retry_limit = Some(limit);
        self
    }

    /// Delay retries, doubling the delay per attempt
    pub fn retry_backoff(mut self, base: Duration) -> Self {
        self.config.retry_backoff = Some(base);
        self
    }

    /// Attach a boundary cancellation token
    pub fn cancel(mut self, token: CancellationToken) -> Self {
        self.config.cancel = Some(token);
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::Config`] when validation fails.
    pub fn build(self) -> Result<CheckConfig, CheckError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
