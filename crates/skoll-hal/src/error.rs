//! Error types for provider and backend operations.

use thiserror::Error;

/// Errors surfaced by providers and backends.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HalError {
    /// No backend registered under the requested name.
    #[error("backend not available: {0}")]
    BackendUnavailable(String),

    /// Job execution failed.
    #[error("job failed: {0}")]
    JobFailed(String),

    /// Job was cancelled.
    #[error("job cancelled")]
    JobCancelled,

    /// No job with the given id.
    #[error("job not found: {0}")]
    JobNotFound(String),

    /// Circuit cannot run on this backend.
    #[error("invalid circuit: {0}")]
    InvalidCircuit(String),

    /// Circuit exceeds backend capabilities.
    #[error("circuit exceeds backend capabilities: {0}")]
    CircuitTooLarge(String),

    /// Requested feature is not supported by this backend.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// Invalid number of shots.
    #[error("invalid shots: {0}")]
    InvalidShots(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Timed out waiting for a job.
    #[error("timeout waiting for job {0}")]
    Timeout(String),

    /// Generic backend error.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Result type for provider and backend operations.
pub type HalResult<T> = Result<T, HalError>;
