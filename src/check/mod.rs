//! The concurrent blacklist check engine and its collaborators

pub mod config;
pub mod engine;
pub mod error;
pub mod report;
pub mod tracker;
pub mod types;

pub use config::{CheckConfig, CheckConfigBuilder};
pub use engine::CheckEngine;
pub use error::CheckError;
pub use report::{PrintSink, ResultSink};
pub use tracker::CompletionTracker;
pub use types::{CheckResult, CheckSummary, CheckTask};
