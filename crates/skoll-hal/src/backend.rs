//! Backend trait and configuration.
//!
//! The [`Backend`] trait defines the lifecycle for running a circuit on a
//! simulation target:
//!
//! ```text
//!   capabilities() ──→ validate() ──→ submit() ──→ status() ──→ result()
//!    (sync, &ref)       (async)       (async)      (async)      (async)
//! ```
//!
//! - `capabilities()` is synchronous and infallible; implementations cache
//!   capabilities at construction time.
//! - `validate()` checks a circuit against backend constraints before
//!   submission, collecting every reason the circuit cannot run.
//! - `submit()` returns a [`JobId`]; `result()` is only valid once
//!   `status()` reports `Completed`.
//! - `wait()` has a provided polling implementation.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use skoll_ir::Circuit;

use crate::capability::Capabilities;
use crate::error::{HalError, HalResult};
use crate::job::{JobId, JobStatus};
use crate::result::ExecutionResult;

/// Configuration for a backend instance.
///
/// The `extra` map carries backend-specific options: `seed`, `max_qubits`,
/// `memory`.
#[derive(Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Name of the backend.
    pub name: String,
    /// Additional configuration.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl BackendConfig {
    /// Create a new backend configuration.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extra: serde_json::Map::new(),
        }
    }

    /// Add an extra option.
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Read an extra option as u64.
    pub fn extra_u64(&self, key: &str) -> Option<u64> {
        self.extra.get(key).and_then(serde_json::Value::as_u64)
    }

    /// Read an extra option as bool.
    pub fn extra_bool(&self, key: &str) -> Option<bool> {
        self.extra.get(key).and_then(serde_json::Value::as_bool)
    }
}

impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("name", &self.name)
            .field("extra", &self.extra)
            .finish()
    }
}

/// Parameter bindings for a submission: symbol name → value.
pub type ParameterBindings = HashMap<String, f64>;

/// Trait implemented by every simulation backend.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Name of this backend.
    fn name(&self) -> &str;

    /// Capabilities of this backend, cached at construction.
    fn capabilities(&self) -> &Capabilities;

    /// Availability with queue information. Local simulators are always
    /// available with an empty queue.
    async fn availability(&self) -> HalResult<BackendAvailability>;

    /// Validate a circuit against backend constraints.
    async fn validate(&self, circuit: &Circuit) -> HalResult<ValidationResult>;

    /// Submit a circuit for execution.
    ///
    /// `parameters` binds symbolic angles by name before execution; a
    /// circuit still carrying unbound symbols after binding is rejected
    /// with [`HalError::InvalidCircuit`].
    async fn submit(
        &self,
        circuit: &Circuit,
        shots: u32,
        parameters: Option<&ParameterBindings>,
    ) -> HalResult<JobId>;

    /// Status of a job.
    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus>;

    /// Result of a completed job.
    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult>;

    /// Cancel a job that has not reached a terminal state.
    async fn cancel(&self, job_id: &JobId) -> HalResult<()>;

    /// Wait for a job to complete and return its result.
    ///
    /// Polls every 500ms for up to 5 minutes.
    async fn wait(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        use tokio::time::sleep;

        let poll_interval = Duration::from_millis(500);
        let max_polls = 600;

        for _ in 0..max_polls {
            match self.status(job_id).await? {
                JobStatus::Completed => return self.result(job_id).await,
                JobStatus::Failed(msg) => return Err(HalError::JobFailed(msg)),
                JobStatus::Cancelled => return Err(HalError::JobCancelled),
                JobStatus::Queued | JobStatus::Running => {
                    sleep(poll_interval).await;
                }
            }
        }

        Err(HalError::Timeout(job_id.0.clone()))
    }
}

/// Availability information for a backend.
#[derive(Debug, Clone)]
pub struct BackendAvailability {
    /// Whether the backend is accepting jobs.
    pub is_available: bool,
    /// Jobs currently queued, if known.
    pub queue_depth: Option<u32>,
    /// Estimated wait for a new job, if known.
    pub estimated_wait: Option<Duration>,
    /// Human-readable status message.
    pub status_message: Option<String>,
}

impl BackendAvailability {
    /// A backend that is always available: zero queue, zero wait.
    pub fn always_available() -> Self {
        Self {
            is_available: true,
            queue_depth: Some(0),
            estimated_wait: Some(Duration::ZERO),
            status_message: None,
        }
    }

    /// An offline backend.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            is_available: false,
            queue_depth: None,
            estimated_wait: None,
            status_message: Some(reason.into()),
        }
    }
}

/// Verdict of circuit validation.
#[derive(Debug, Clone)]
pub enum ValidationResult {
    /// Circuit can be submitted as-is.
    Valid,
    /// Circuit cannot run on this backend.
    Invalid {
        /// Reasons the circuit is invalid.
        reasons: Vec<String>,
    },
}

impl ValidationResult {
    /// Whether the circuit can be submitted as-is.
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    /// Collapse a list of problems into a verdict.
    pub fn from_reasons(reasons: Vec<String>) -> Self {
        if reasons.is_empty() {
            ValidationResult::Valid
        } else {
            ValidationResult::Invalid { reasons }
        }
    }
}

/// Trait for creating backends from configuration.
pub trait BackendFactory: Backend + Sized {
    /// Create a backend from configuration.
    fn from_config(config: BackendConfig) -> HalResult<Self>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_extras() {
        let config = BackendConfig::new("qasm_simulator")
            .with_extra("seed", serde_json::json!(1234))
            .with_extra("memory", serde_json::json!(true));

        assert_eq!(config.extra_u64("seed"), Some(1234));
        assert_eq!(config.extra_bool("memory"), Some(true));
        assert_eq!(config.extra_u64("max_qubits"), None);
    }

    #[test]
    fn availability_constructors() {
        let up = BackendAvailability::always_available();
        assert!(up.is_available);
        assert_eq!(up.queue_depth, Some(0));

        let down = BackendAvailability::unavailable("maintenance");
        assert!(!down.is_available);
        assert_eq!(down.status_message.as_deref(), Some("maintenance"));
    }

    #[test]
    fn validation_from_reasons() {
        assert!(ValidationResult::from_reasons(vec![]).is_valid());
        assert!(!ValidationResult::from_reasons(vec!["too wide".into()]).is_valid());
    }
}
