//! Error types for blacklist check runs

use thiserror::Error;

/// Errors that abort a check run before any work is queued
#[derive(Debug, Error)]
pub enum CheckError {
    /// The CIDR block could not be parsed
    ///
    /// Target expansion failed, so no tasks were created.
    #[error("invalid CIDR block '{input}': {reason}")]
    InvalidCidr {
        /// The string that failed to parse
        input: String,
        /// Parser diagnostic
        reason: String,
    },

    /// The engine configuration failed validation
    #[error("invalid configuration: {0}")]
    Config(String),
}
