//! Error taxonomy shared by drivers, extractors and statistics.
//!
//! "No acceptable result" is deliberately absent: insufficient data is an
//! ordinary `Option::None`, never an error.

use thiserror::Error;

/// Errors raised by the benchmarking core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BenchError {
    /// A driver was stepped after exhaustion, or some other contract
    /// violation between engine and driver.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Statistics were requested on an empty sample.
    #[error("invalid state: statistics requested on an empty sample")]
    EmptySample,

    /// A configuration value is out of range or a binding is missing.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A raw run trace violates the trace invariants (e.g. budget decreases).
    #[error("malformed trace in run {run}: {reason}")]
    MalformedTrace { run: usize, reason: String },
}

impl BenchError {
    /// Whether the error aborts a whole batch rather than a single key.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            BenchError::MalformedTrace { .. } | BenchError::InvalidState(_)
        )
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, BenchError>;
