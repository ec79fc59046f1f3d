//! Sköll Provider and Backend Abstraction Layer
//!
//! This crate defines the contract between the host framework and the
//! simulation backends: a [`Backend`] trait for the job lifecycle,
//! [`Capabilities`] for introspection, [`Counts`] / [`ExecutionResult`]
//! for unified result handling, and a [`BackendRegistry`] acting as the
//! provider that exposes backends by name.
//!
//! # Example: Running a Circuit
//!
//! ```ignore
//! use skoll_adapter_local::QasmBackend;
//! use skoll_hal::Backend;
//! use skoll_ir::Circuit;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let circuit = Circuit::bell()?;
//!     let backend = QasmBackend::new();
//!
//!     let job_id = backend.submit(&circuit, 1000, None).await?;
//!     let result = backend.wait(&job_id).await?;
//!
//!     // Expect ~50% |00⟩ and ~50% |11⟩
//!     if let Some((bitstring, count)) = result.counts.most_frequent() {
//!         println!("most frequent: {bitstring} ({count} times)");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Implementing a Backend
//!
//! ```ignore
//! use skoll_hal::{
//!     Backend, BackendAvailability, Capabilities, ExecutionResult, HalResult,
//!     JobId, JobStatus, ParameterBindings, ValidationResult,
//! };
//! use skoll_ir::Circuit;
//! use async_trait::async_trait;
//!
//! struct MyBackend {
//!     capabilities: Capabilities,
//! }
//!
//! #[async_trait]
//! impl Backend for MyBackend {
//!     fn name(&self) -> &str { "my_backend" }
//!
//!     // Sync, infallible: capabilities cached at construction.
//!     fn capabilities(&self) -> &Capabilities { &self.capabilities }
//!
//!     async fn availability(&self) -> HalResult<BackendAvailability> {
//!         Ok(BackendAvailability::always_available())
//!     }
//!
//!     async fn validate(&self, circuit: &Circuit) -> HalResult<ValidationResult> {
//!         Ok(ValidationResult::Valid)
//!     }
//!
//!     async fn submit(
//!         &self,
//!         circuit: &Circuit,
//!         shots: u32,
//!         parameters: Option<&ParameterBindings>,
//!     ) -> HalResult<JobId> {
//!         # todo!()
//!     }
//!
//!     async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
//!         # todo!()
//!     }
//!
//!     async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
//!         # todo!()
//!     }
//!
//!     async fn cancel(&self, job_id: &JobId) -> HalResult<()> {
//!         # todo!()
//!     }
//! }
//! ```

pub mod backend;
pub mod capability;
pub mod error;
pub mod job;
pub mod plugin;
pub mod registry;
pub mod result;

pub use backend::{
    Backend, BackendAvailability, BackendConfig, BackendFactory, ParameterBindings,
    ValidationResult,
};
pub use capability::{Capabilities, GateSet, Topology, TopologyKind};
pub use error::{HalError, HalResult};
pub use job::{Job, JobId, JobStatus};
pub use plugin::{BackendPlugin, PluginInfo};
pub use registry::BackendRegistry;
pub use result::{Counts, ExecutionResult, Snapshots};
