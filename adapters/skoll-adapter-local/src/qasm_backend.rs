//! Qasm simulator backend.
//!
//! Executes a circuit for a number of shots and returns measurement
//! counts. Supports mid-circuit measurement, reset, classically
//! conditioned gates, statevector snapshots, and per-shot memory.
//!
//! Circuits whose measurements all come last are executed once and
//! sampled from the final distribution; anything with mid-circuit
//! classical flow falls back to a full per-shot loop with projective
//! collapse.

use std::time::Instant;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;
use tracing::{debug, instrument, warn};

use skoll_hal::{
    Backend, BackendAvailability, BackendConfig, BackendFactory, Capabilities, Counts,
    ExecutionResult, HalError, HalResult, Job, JobId, JobStatus, ParameterBindings, Snapshots,
    ValidationResult,
};
use skoll_ir::{Circuit, ClassicalCondition, InstructionKind};

use crate::QASM_SIMULATOR;
use crate::error::SimulatorError;
use crate::jobs::JobTable;
use crate::statevector::Statevector;
use crate::statevector_backend::DEFAULT_MAX_QUBITS;

/// Classical state is packed into a u64.
const MAX_CLBITS: u32 = 64;

/// Local qasm (counts) simulator.
pub struct QasmBackend {
    config: BackendConfig,
    capabilities: Capabilities,
    jobs: JobTable,
    max_qubits: u32,
    seed: Option<u64>,
    memory: bool,
}

impl QasmBackend {
    /// Create a backend with default settings.
    pub fn new() -> Self {
        Self::from_parts(BackendConfig::new(QASM_SIMULATOR), DEFAULT_MAX_QUBITS, None, false)
    }

    /// Create a backend with a custom qubit limit.
    pub fn with_max_qubits(max_qubits: u32) -> Self {
        Self::from_parts(BackendConfig::new(QASM_SIMULATOR), max_qubits, None, false)
    }

    /// Fix the sampling seed, making every run reproducible.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Record each shot's outcome bitstring in the result.
    #[must_use]
    pub fn with_memory(mut self) -> Self {
        self.memory = true;
        self
    }

    fn from_parts(config: BackendConfig, max_qubits: u32, seed: Option<u64>, memory: bool) -> Self {
        Self {
            capabilities: Capabilities::simulator(&config.name, max_qubits)
                .with_feature("conditional_gates")
                .with_feature("snapshots")
                .with_feature("memory"),
            config,
            jobs: JobTable::new(),
            max_qubits,
            seed,
            memory,
        }
    }

    /// Whether every measurement is a trailing instruction, with no
    /// classical flow anywhere. Such circuits can be simulated once and
    /// sampled.
    fn is_sampleable(circuit: &Circuit) -> bool {
        let mut measured = false;
        for instruction in circuit.instructions() {
            match &instruction.kind {
                InstructionKind::Reset | InstructionKind::Snapshot { .. } => return false,
                InstructionKind::Gate(gate) => {
                    if gate.condition.is_some() || measured {
                        return false;
                    }
                }
                InstructionKind::Measure => measured = true,
                InstructionKind::Barrier => {}
            }
        }
        true
    }

    #[instrument(skip(self, circuit), fields(backend = %self.config.name))]
    fn run_circuit(
        &self,
        circuit: &Circuit,
        shots: u32,
        seed: u64,
    ) -> Result<ExecutionResult, HalError> {
        let start = Instant::now();
        let mut rng = StdRng::seed_from_u64(seed);
        debug!(
            qubits = circuit.num_qubits(),
            shots,
            seed,
            "starting qasm simulation"
        );

        let mut counts = Counts::new();
        let mut memory = self.memory.then(Vec::new);
        let mut snapshots = Snapshots::default();

        if Self::is_sampleable(circuit) {
            self.run_sampled(circuit, shots, &mut rng, &mut counts, memory.as_mut())?;
        } else {
            self.run_per_shot(
                circuit,
                shots,
                &mut rng,
                &mut counts,
                memory.as_mut(),
                &mut snapshots,
            )?;
        }

        let elapsed = start.elapsed();
        debug!("qasm simulation completed in {:?}", elapsed);

        let mut result = ExecutionResult::new(counts, shots)
            .with_seed(seed)
            .with_snapshots(snapshots)
            .with_execution_time(elapsed.as_millis() as u64);
        if let Some(memory) = memory {
            result = result.with_memory(memory);
        }
        Ok(result)
    }

    /// Simulate once, then draw every shot from the final distribution.
    fn run_sampled(
        &self,
        circuit: &Circuit,
        shots: u32,
        rng: &mut StdRng,
        counts: &mut Counts,
        mut memory: Option<&mut Vec<String>>,
    ) -> Result<(), HalError> {
        let mut sv = Statevector::new(circuit.num_qubits());
        let mut measures: Vec<(usize, usize)> = vec![];

        for instruction in circuit.instructions() {
            match &instruction.kind {
                InstructionKind::Gate(gate) => {
                    let qubits: Vec<_> =
                        instruction.qubits.iter().map(|q| q.index()).collect();
                    sv.apply_gate(&gate.gate, &qubits).map_err(HalError::from)?;
                }
                InstructionKind::Measure => {
                    for (q, c) in instruction.qubits.iter().zip(&instruction.clbits) {
                        measures.push((q.index(), c.index()));
                    }
                }
                InstructionKind::Barrier => {}
                // is_sampleable filtered the rest
                _ => unreachable!("non-sampleable instruction in sampled run"),
            }
        }

        for _ in 0..shots {
            let outcome = sv.sample(rng);
            let mut classical_state = 0u64;
            for &(q, c) in &measures {
                let bit = (outcome >> q) as u64 & 1;
                classical_state = (classical_state & !(1u64 << c)) | (bit << c);
            }
            self.record_outcome(circuit, classical_state, counts, memory.as_deref_mut());
        }
        Ok(())
    }

    /// Full shot loop with projective collapse and classical flow.
    fn run_per_shot(
        &self,
        circuit: &Circuit,
        shots: u32,
        rng: &mut StdRng,
        counts: &mut Counts,
        mut memory: Option<&mut Vec<String>>,
        snapshots: &mut Snapshots,
    ) -> Result<(), HalError> {
        for _ in 0..shots {
            let mut sv = Statevector::new(circuit.num_qubits());
            let mut classical_state = 0u64;

            for instruction in circuit.instructions() {
                match &instruction.kind {
                    InstructionKind::Gate(gate) => {
                        if let Some(condition) = &gate.condition {
                            if !self.condition_holds(circuit, condition, classical_state)? {
                                continue;
                            }
                        }
                        let qubits: Vec<_> =
                            instruction.qubits.iter().map(|q| q.index()).collect();
                        sv.apply_gate(&gate.gate, &qubits).map_err(HalError::from)?;
                    }
                    InstructionKind::Measure => {
                        for (q, c) in instruction.qubits.iter().zip(&instruction.clbits) {
                            let outcome = u64::from(sv.measure_collapse(q.index(), rng));
                            let bit = 1u64 << c.index();
                            classical_state = (classical_state & !bit) | (outcome << c.index());
                        }
                    }
                    InstructionKind::Reset => {
                        sv.reset(instruction.qubits[0].index(), rng);
                    }
                    InstructionKind::Barrier => {}
                    InstructionKind::Snapshot { label } => {
                        snapshots
                            .entry(label.clone())
                            .or_default()
                            .push(sv.amplitudes().to_vec());
                    }
                }
            }

            self.record_outcome(circuit, classical_state, counts, memory.as_deref_mut());
        }
        Ok(())
    }

    fn condition_holds(
        &self,
        circuit: &Circuit,
        condition: &ClassicalCondition,
        classical_state: u64,
    ) -> Result<bool, HalError> {
        let layout = circuit
            .cregs()
            .iter()
            .find(|reg| reg.name == condition.register)
            .ok_or_else(|| {
                HalError::from(SimulatorError::UnknownConditionRegister(
                    condition.register.clone(),
                ))
            })?;
        let value = (classical_state >> layout.offset) & bit_mask(layout.size);
        Ok(value == condition.value)
    }

    fn record_outcome(
        &self,
        circuit: &Circuit,
        classical_state: u64,
        counts: &mut Counts,
        memory: Option<&mut Vec<String>>,
    ) {
        if circuit.num_clbits() == 0 {
            return;
        }
        let bitstring = format_classical(circuit, classical_state);
        if let Some(memory) = memory {
            memory.push(bitstring.clone());
        }
        counts.record(bitstring);
    }
}

impl Default for QasmBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a packed classical state the way the host framework expects:
/// one group per classical register, later-declared register leftmost,
/// most-significant bit first within a group. Loose classical bits fall
/// back to a single zero-padded group.
fn format_classical(circuit: &Circuit, classical_state: u64) -> String {
    if circuit.cregs().is_empty() {
        return format!(
            "{:0width$b}",
            classical_state,
            width = circuit.num_clbits()
        );
    }
    let groups: Vec<String> = circuit
        .cregs()
        .iter()
        .map(|reg| {
            let value = (classical_state >> reg.offset) & bit_mask(reg.size);
            format!("{:0width$b}", value, width = reg.size as usize)
        })
        .collect();
    groups
        .iter()
        .rev()
        .cloned()
        .collect::<Vec<_>>()
        .join(" ")
}

fn bit_mask(size: u32) -> u64 {
    if size >= 64 {
        u64::MAX
    } else {
        (1u64 << size) - 1
    }
}

#[async_trait]
impl Backend for QasmBackend {
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
        let mut reasons = vec![];
        if circuit.num_qubits() > self.max_qubits as usize {
            reasons.push(format!(
                "circuit has {} qubits but the backend supports {}",
                circuit.num_qubits(),
                self.max_qubits
            ));
        }
        if circuit.num_clbits() > MAX_CLBITS as usize {
            reasons.push(format!(
                "circuit has {} classical bits but the backend supports {}",
                circuit.num_clbits(),
                MAX_CLBITS
            ));
        }
        for gate in self.capabilities.unsupported_gates(circuit) {
            reasons.push(format!("unsupported gate '{gate}'"));
        }
        for instruction in circuit.instructions() {
            if let Some(gate) = instruction.as_gate() {
                if let Some(condition) = &gate.condition {
                    if !circuit.cregs().iter().any(|r| r.name == condition.register) {
                        reasons.push(format!(
                            "conditional gate references unknown register '{}'",
                            condition.register
                        ));
                    }
                }
            }
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
        if shots > self.capabilities.max_shots {
            return Err(HalError::InvalidShots(format!(
                "{} shots exceeds the backend limit of {}",
                shots, self.capabilities.max_shots
            )));
        }
        if circuit.num_qubits() > self.max_qubits as usize {
            return Err(SimulatorError::TooManyQubits {
                requested: circuit.num_qubits(),
                max: self.max_qubits,
            }
            .into());
        }
        if circuit.num_clbits() > MAX_CLBITS as usize {
            return Err(SimulatorError::TooManyClbits {
                requested: circuit.num_clbits(),
                max: MAX_CLBITS,
            }
            .into());
        }

        let bound;
        let circuit = match parameters {
            Some(bindings) => {
                let fx: FxHashMap<String, f64> =
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

        if !circuit.has_measurements() {
            warn!(
                circuit = circuit.name(),
                "no measurements in circuit, classical register will remain all zeros"
            );
        }

        let seed = self.seed.unwrap_or_else(|| rand::thread_rng().r#gen());
        let result = self.run_circuit(circuit, shots, seed)?;

        let job_id = JobId::random();
        let job = Job::new(job_id.clone(), shots)
            .on_backend(&self.config.name)
            .with_seed(seed);
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

impl BackendFactory for QasmBackend {
    fn from_config(config: BackendConfig) -> HalResult<Self> {
        let max_qubits = config
            .extra_u64("max_qubits")
            .map_or(DEFAULT_MAX_QUBITS, |v| v as u32);
        if max_qubits == 0 {
            return Err(HalError::Configuration(
                "max_qubits must be at least 1".into(),
            ));
        }
        let seed = config.extra_u64("seed");
        let memory = config.extra_bool("memory").unwrap_or(false);
        Ok(Self::from_parts(config, max_qubits, seed, memory))
    }
}
