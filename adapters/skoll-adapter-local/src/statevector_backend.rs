//! Statevector simulator backend.
//!
//! Runs a circuit once and returns the final amplitude vector. The
//! backend executes gates only: measurements, resets, conditionals, and
//! snapshots have no meaning when the deliverable is the exact state.

use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use skoll_hal::{
    Backend, BackendAvailability, BackendConfig, BackendFactory, Capabilities, ExecutionResult,
    HalError, HalResult, Job, JobId, JobStatus, ParameterBindings, ValidationResult,
};
use skoll_ir::{Circuit, InstructionKind};

use crate::STATEVECTOR_SIMULATOR;
use crate::error::SimulatorError;
use crate::jobs::JobTable;
use crate::statevector::Statevector;

/// Default qubit limit for the local backends (~512 MB of amplitudes).
pub(crate) const DEFAULT_MAX_QUBITS: u32 = 25;

/// Local statevector simulator.
pub struct StatevectorBackend {
    config: BackendConfig,
    capabilities: Capabilities,
    jobs: JobTable,
    max_qubits: u32,
}

impl StatevectorBackend {
    /// Create a backend with default settings.
    pub fn new() -> Self {
        Self::with_max_qubits(DEFAULT_MAX_QUBITS)
    }

    /// Create a backend with a custom qubit limit.
    pub fn with_max_qubits(max_qubits: u32) -> Self {
        let config = BackendConfig::new(STATEVECTOR_SIMULATOR);
        Self {
            capabilities: Capabilities::simulator(&config.name, max_qubits)
                .with_feature("statevector"),
            config,
            jobs: JobTable::new(),
            max_qubits,
        }
    }

    /// Operations this backend refuses to execute, by name.
    fn rejected_operations(circuit: &Circuit) -> Vec<String> {
        let mut reasons = vec![];
        for instruction in circuit.instructions() {
            match &instruction.kind {
                InstructionKind::Measure => {
                    reasons.push("measurements are not supported".to_string());
                }
                InstructionKind::Reset => {
                    reasons.push("reset is not supported".to_string());
                }
                InstructionKind::Snapshot { .. } => {
                    reasons.push("snapshots are not supported".to_string());
                }
                InstructionKind::Gate(gate) if gate.condition.is_some() => {
                    reasons.push("conditional gates are not supported".to_string());
                }
                _ => {}
            }
        }
        reasons.sort();
        reasons.dedup();
        reasons
    }

    #[instrument(skip(self, circuit))]
    fn run_circuit(&self, circuit: &Circuit) -> Result<ExecutionResult, HalError> {
        let start = Instant::now();
        debug!(
            qubits = circuit.num_qubits(),
            instructions = circuit.instructions().len(),
            "starting statevector simulation"
        );

        let mut sv = Statevector::new(circuit.num_qubits());
        for instruction in circuit.instructions() {
            match &instruction.kind {
                InstructionKind::Gate(gate) => {
                    if gate.condition.is_some() {
                        return Err(SimulatorError::UnsupportedOperation {
                            backend: self.config.name.clone(),
                            op: format!("conditional {}", gate.name()),
                        }
                        .into());
                    }
                    let qubits: Vec<_> =
                        instruction.qubits.iter().map(|q| q.index()).collect();
                    sv.apply_gate(&gate.gate, &qubits)
                        .map_err(HalError::from)?;
                }
                InstructionKind::Barrier => {}
                other => {
                    return Err(SimulatorError::UnsupportedOperation {
                        backend: self.config.name.clone(),
                        op: match other {
                            InstructionKind::Measure => "measure".to_string(),
                            InstructionKind::Reset => "reset".to_string(),
                            InstructionKind::Snapshot { .. } => "snapshot".to_string(),
                            InstructionKind::Gate(_) | InstructionKind::Barrier => unreachable!(),
                        },
                    }
                    .into());
                }
            }
        }

        let elapsed = start.elapsed();
        debug!("statevector simulation completed in {:?}", elapsed);
        Ok(ExecutionResult::from_statevector(sv.into_amplitudes())
            .with_execution_time(elapsed.as_millis() as u64))
    }
}

impl Default for StatevectorBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for StatevectorBackend {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn availability(&self) -> HalResult<BackendAvailability> {
        Ok(BackendAvailability::always_available())
    }

    async fn validate(&self, circuit: &Circuit) -> HalResult<ValidationResult> {
        let mut reasons = Self::rejected_operations(circuit);
        if circuit.num_qubits() > self.max_qubits as usize {
            reasons.push(format!(
                "circuit has {} qubits but the backend supports {}",
                circuit.num_qubits(),
                self.max_qubits
            ));
        }
        for gate in self.capabilities.unsupported_gates(circuit) {
            reasons.push(format!("unsupported gate '{gate}'"));
        }
        Ok(ValidationResult::from_reasons(reasons))
    }

    async fn submit(
        &self,
        circuit: &Circuit,
        shots: u32,
        parameters: Option<&ParameterBindings>,
    ) -> HalResult<JobId> {
        if shots == 0 {
            return Err(HalError::InvalidShots("shots must be at least 1".into()));
        }
        if shots != 1 {
            info!(
                circuit = circuit.name(),
                shots, "statevector simulator only supports one shot; setting shots=1"
            );
        }
        if circuit.num_qubits() > self.max_qubits as usize {
            return Err(SimulatorError::TooManyQubits {
                requested: circuit.num_qubits(),
                max: self.max_qubits,
            }
            .into());
        }

        let bound;
        let circuit = match parameters {
            Some(bindings) => {
                let fx: rustc_hash::FxHashMap<String, f64> =
                    bindings.iter().map(|(k, v)| (k.clone(), *v)).collect();
                bound = circuit.bind_parameters(&fx);
                &bound
            }
            None => circuit,
        };
        if circuit.is_parameterized() {
            let symbols: Vec<_> = circuit.parameters().into_iter().collect();
            return Err(SimulatorError::UnboundParameters(symbols.join(", ")).into());
        }

        let result = self.run_circuit(circuit)?;
        let job_id = JobId::random();
        let job = Job::new(job_id.clone(), 1).on_backend(&self.config.name);
        self.jobs.insert_completed(job, result);
        debug!("submitted job: {}", job_id);
        Ok(job_id)
    }

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        self.jobs.status(job_id)
    }

    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        self.jobs.result(job_id)
    }

    async fn cancel(&self, job_id: &JobId) -> HalResult<()> {
        self.jobs.cancel(job_id)
    }
}

impl BackendFactory for StatevectorBackend {
    fn from_config(config: BackendConfig) -> HalResult<Self> {
        let max_qubits = config
            .extra_u64("max_qubits")
            .map_or(DEFAULT_MAX_QUBITS, |v| v as u32);
        if max_qubits == 0 {
            return Err(HalError::Configuration(
                "max_qubits must be at least 1".into(),
            ));
        }
        Ok(Self {
            capabilities: Capabilities::simulator(&config.name, max_qubits)
                .with_feature("statevector"),
            config,
            jobs: JobTable::new(),
            max_qubits,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skoll_ir::QubitId;
    use std::f64::consts::FRAC_1_SQRT_2;

    #[tokio::test]
    async fn capabilities_report_statevector_feature() {
        let backend = StatevectorBackend::new();
        let caps = backend.capabilities();
        assert!(caps.is_simulator);
        assert_eq!(caps.num_qubits, DEFAULT_MAX_QUBITS);
        assert!(caps.has_feature("statevector"));
    }

    #[tokio::test]
    async fn bell_amplitudes() {
        let backend = StatevectorBackend::new();
        let mut circuit = Circuit::with_size("bell_no_measure", 2, 0);
        circuit.h(QubitId(0)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();

        let job_id = backend.submit(&circuit, 1, None).await.unwrap();
        let result = backend.wait(&job_id).await.unwrap();
        let sv = result.statevector.unwrap();

        assert!((sv[0].re - FRAC_1_SQRT_2).abs() < 1e-10);
        assert!(sv[1].norm() < 1e-10);
        assert!(sv[2].norm() < 1e-10);
        assert!((sv[3].re - FRAC_1_SQRT_2).abs() < 1e-10);
    }

    #[tokio::test]
    async fn shots_are_coerced_to_one() {
        let backend = StatevectorBackend::new();
        let mut circuit = Circuit::with_size("c", 1, 0);
        circuit.h(QubitId(0)).unwrap();

        let job_id = backend.submit(&circuit, 1024, None).await.unwrap();
        let result = backend.result(&job_id).await.unwrap();
        assert_eq!(result.shots, 1);
    }

    #[tokio::test]
    async fn zero_shots_rejected() {
        let backend = StatevectorBackend::new();
        let circuit = Circuit::with_size("c", 1, 0);
        let result = backend.submit(&circuit, 0, None).await;
        assert!(matches!(result, Err(HalError::InvalidShots(_))));
    }

    #[tokio::test]
    async fn measurements_rejected() {
        let backend = StatevectorBackend::new();
        let circuit = Circuit::bell().unwrap();

        let verdict = backend.validate(&circuit).await.unwrap();
        assert!(!verdict.is_valid());

        let result = backend.submit(&circuit, 1, None).await;
        assert!(matches!(result, Err(HalError::Unsupported(_))));
    }

    #[tokio::test]
    async fn too_many_qubits_rejected() {
        let backend = StatevectorBackend::with_max_qubits(4);
        let circuit = Circuit::with_size("wide", 10, 0);
        let result = backend.submit(&circuit, 1, None).await;
        assert!(matches!(result, Err(HalError::CircuitTooLarge(_))));
    }

    #[tokio::test]
    async fn parameters_bound_at_submit() {
        use std::f64::consts::PI;

        let backend = StatevectorBackend::new();
        let mut circuit = Circuit::with_size("var", 1, 0);
        circuit
            .rx(skoll_ir::ParameterExpression::symbol("theta"), QubitId(0))
            .unwrap();

        // Unbound: rejected.
        let err = backend.submit(&circuit, 1, None).await;
        assert!(matches!(err, Err(HalError::InvalidCircuit(_))));

        // Bound to π: |1⟩.
        let bindings: ParameterBindings = [("theta".to_string(), PI)].into_iter().collect();
        let job_id = backend.submit(&circuit, 1, Some(&bindings)).await.unwrap();
        let sv = backend.result(&job_id).await.unwrap().statevector.unwrap();
        assert!(sv[1].norm() > 1.0 - 1e-10);
    }

    #[tokio::test]
    async fn empty_circuit_gives_unit_amplitude() {
        let backend = StatevectorBackend::new();
        let circuit = Circuit::new("empty");
        let job_id = backend.submit(&circuit, 1, None).await.unwrap();
        let sv = backend.result(&job_id).await.unwrap().statevector.unwrap();
        assert_eq!(sv.len(), 1);
        assert!((sv[0].re - 1.0).abs() < 1e-12);
    }
}
