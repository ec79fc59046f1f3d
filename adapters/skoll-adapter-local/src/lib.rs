//! Sköll Local Simulator Backends
//!
//! Two locally-executed simulation backends behind the `skoll-hal`
//! provider interface:
//!
//! - **`statevector_simulator`**: runs a circuit once and returns the
//!   exact final amplitude vector.
//! - **`qasm_simulator`**: runs a circuit for a number of shots and
//!   returns measurement counts; supports mid-circuit measurement,
//!   reset, classically conditioned gates, snapshots, and per-shot
//!   memory.
//!
//! Statevector simulation is exact but memory-bound:
//!
//! | Qubits | Amplitudes | Memory |
//! |--------|------------|--------|
//! | 10 | 1 024 | ~16 KB |
//! | 20 | ~1 M | ~16 MB |
//! | 25 | ~33 M | ~512 MB |
//! | 30 | ~1 B | ~16 GB |
//!
//! # Example
//!
//! ```ignore
//! use skoll_adapter_local::LocalProvider;
//! use skoll_hal::Backend;
//! use skoll_ir::Circuit;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let provider = LocalProvider::new();
//!     let backend = provider.get_backend("qasm_simulator")?;
//!
//!     let circuit = Circuit::bell()?;
//!     let job_id = backend.submit(&circuit, 1000, None).await?;
//!     let result = backend.wait(&job_id).await?;
//!
//!     // Expect ~50% |00⟩ and ~50% |11⟩
//!     println!("counts: {:?}", result.counts);
//!     Ok(())
//! }
//! ```

mod error;
mod jobs;
mod provider;
mod qasm_backend;
mod statevector;
mod statevector_backend;

pub use error::SimulatorError;
pub use provider::{LocalProvider, registry};
pub use qasm_backend::QasmBackend;
pub use statevector::Statevector;
pub use statevector_backend::StatevectorBackend;

/// Public name of the statevector backend.
pub const STATEVECTOR_SIMULATOR: &str = "statevector_simulator";
/// Public name of the qasm backend.
pub const QASM_SIMULATOR: &str = "qasm_simulator";
