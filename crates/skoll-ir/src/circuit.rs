//! High-level circuit builder.

use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeSet;

use crate::error::{IrError, IrResult};
use crate::gate::{ClassicalCondition, Gate, StandardGate};
use crate::instruction::{Instruction, InstructionKind};
use crate::parameter::ParameterExpression;
use crate::qubit::{Clbit, ClbitId, CregLayout, Qubit, QubitId};

/// A quantum circuit.
///
/// Instructions are stored in program order; both simulator backends
/// execute them strictly sequentially, so no graph representation is
/// kept. The builder validates operands as they are applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Circuit {
    name: String,
    qubits: Vec<Qubit>,
    clbits: Vec<Clbit>,
    cregs: Vec<CregLayout>,
    instructions: Vec<Instruction>,
}

impl Circuit {
    /// Create a new empty circuit.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            qubits: vec![],
            clbits: vec![],
            cregs: vec![],
            instructions: vec![],
        }
    }

    /// Create a circuit with anonymous qubits and classical bits.
    pub fn with_size(name: impl Into<String>, num_qubits: u32, num_clbits: u32) -> Self {
        let mut circuit = Self::new(name);
        for _ in 0..num_qubits {
            circuit.add_qubit();
        }
        for _ in 0..num_clbits {
            circuit.add_clbit();
        }
        circuit
    }

    /// Add a single loose qubit.
    pub fn add_qubit(&mut self) -> QubitId {
        let id = QubitId(self.qubits.len() as u32);
        self.qubits.push(Qubit::new(id));
        id
    }

    /// Add a quantum register.
    pub fn add_qreg(&mut self, name: impl Into<String>, size: u32) -> Vec<QubitId> {
        let name = name.into();
        (0..size)
            .map(|i| {
                let id = QubitId(self.qubits.len() as u32);
                self.qubits.push(Qubit::in_register(id, &name, i));
                id
            })
            .collect()
    }

    /// Add a single loose classical bit.
    pub fn add_clbit(&mut self) -> ClbitId {
        let id = ClbitId(self.clbits.len() as u32);
        self.clbits.push(Clbit::new(id));
        id
    }

    /// Add a classical register.
    ///
    /// Register order and bit offsets determine how the qasm backend
    /// formats counts keys.
    pub fn add_creg(&mut self, name: impl Into<String>, size: u32) -> Vec<ClbitId> {
        let name = name.into();
        let offset = self.clbits.len() as u32;
        let ids: Vec<_> = (0..size)
            .map(|i| {
                let id = ClbitId(self.clbits.len() as u32);
                self.clbits.push(Clbit::in_register(id, &name, i));
                id
            })
            .collect();
        self.cregs.push(CregLayout { name, offset, size });
        ids
    }

    /// Append a validated instruction.
    pub fn append(&mut self, instruction: Instruction) -> IrResult<&mut Self> {
        self.validate_instruction(&instruction)?;
        self.instructions.push(instruction);
        Ok(self)
    }

    fn validate_instruction(&self, instruction: &Instruction) -> IrResult<()> {
        let name = instruction.name().to_string();

        if let InstructionKind::Gate(gate) = &instruction.kind {
            let expected = gate.gate.num_qubits();
            let got = instruction.qubits.len() as u32;
            if expected != got {
                return Err(IrError::QubitCountMismatch {
                    gate: name,
                    expected,
                    got,
                });
            }
        }

        let mut seen = FxHashSet::default();
        for &qubit in &instruction.qubits {
            if qubit.index() >= self.qubits.len() {
                return Err(IrError::QubitOutOfRange {
                    qubit,
                    num_qubits: self.qubits.len(),
                    gate: name,
                });
            }
            if !seen.insert(qubit) {
                return Err(IrError::DuplicateQubit { qubit, gate: name });
            }
        }

        if instruction.is_measure() && instruction.qubits.len() != instruction.clbits.len() {
            return Err(IrError::MeasureArityMismatch {
                qubits: instruction.qubits.len(),
                clbits: instruction.clbits.len(),
            });
        }
        for &clbit in &instruction.clbits {
            if clbit.index() >= self.clbits.len() {
                return Err(IrError::ClbitOutOfRange {
                    clbit,
                    num_clbits: self.clbits.len(),
                });
            }
        }

        Ok(())
    }

    // =========================================================================
    // Single-qubit gates
    // =========================================================================

    /// Apply Hadamard gate.
    pub fn h(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::single_qubit_gate(StandardGate::H, qubit))
    }

    /// Apply Pauli-X gate.
    pub fn x(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::single_qubit_gate(StandardGate::X, qubit))
    }

    /// Apply Pauli-Y gate.
    pub fn y(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::single_qubit_gate(StandardGate::Y, qubit))
    }

    /// Apply Pauli-Z gate.
    pub fn z(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::single_qubit_gate(StandardGate::Z, qubit))
    }

    /// Apply identity gate.
    pub fn id(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::single_qubit_gate(StandardGate::I, qubit))
    }

    /// Apply S gate.
    pub fn s(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::single_qubit_gate(StandardGate::S, qubit))
    }

    /// Apply S-dagger gate.
    pub fn sdg(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::single_qubit_gate(StandardGate::Sdg, qubit))
    }

    /// Apply T gate.
    pub fn t(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::single_qubit_gate(StandardGate::T, qubit))
    }

    /// Apply T-dagger gate.
    pub fn tdg(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::single_qubit_gate(StandardGate::Tdg, qubit))
    }

    /// Apply sqrt(X) gate.
    pub fn sx(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::single_qubit_gate(StandardGate::SX, qubit))
    }

    /// Apply sqrt(X)-dagger gate.
    pub fn sxdg(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::single_qubit_gate(StandardGate::SXdg, qubit))
    }

    /// Apply Rx rotation.
    pub fn rx(
        &mut self,
        theta: impl Into<ParameterExpression>,
        qubit: QubitId,
    ) -> IrResult<&mut Self> {
        self.append(Instruction::single_qubit_gate(
            StandardGate::Rx(theta.into()),
            qubit,
        ))
    }

    /// Apply Ry rotation.
    pub fn ry(
        &mut self,
        theta: impl Into<ParameterExpression>,
        qubit: QubitId,
    ) -> IrResult<&mut Self> {
        self.append(Instruction::single_qubit_gate(
            StandardGate::Ry(theta.into()),
            qubit,
        ))
    }

    /// Apply Rz rotation.
    pub fn rz(
        &mut self,
        theta: impl Into<ParameterExpression>,
        qubit: QubitId,
    ) -> IrResult<&mut Self> {
        self.append(Instruction::single_qubit_gate(
            StandardGate::Rz(theta.into()),
            qubit,
        ))
    }

    /// Apply phase gate.
    pub fn p(
        &mut self,
        theta: impl Into<ParameterExpression>,
        qubit: QubitId,
    ) -> IrResult<&mut Self> {
        self.append(Instruction::single_qubit_gate(
            StandardGate::P(theta.into()),
            qubit,
        ))
    }

    /// Apply universal U(θ, φ, λ) gate.
    pub fn u(
        &mut self,
        theta: impl Into<ParameterExpression>,
        phi: impl Into<ParameterExpression>,
        lambda: impl Into<ParameterExpression>,
        qubit: QubitId,
    ) -> IrResult<&mut Self> {
        self.append(Instruction::single_qubit_gate(
            StandardGate::U(theta.into(), phi.into(), lambda.into()),
            qubit,
        ))
    }

    /// Apply u1(λ), the legacy name for the phase gate.
    pub fn u1(
        &mut self,
        lambda: impl Into<ParameterExpression>,
        qubit: QubitId,
    ) -> IrResult<&mut Self> {
        self.p(lambda, qubit)
    }

    /// Apply u2(φ, λ) ≡ U(π/2, φ, λ).
    pub fn u2(
        &mut self,
        phi: impl Into<ParameterExpression>,
        lambda: impl Into<ParameterExpression>,
        qubit: QubitId,
    ) -> IrResult<&mut Self> {
        let half_pi = ParameterExpression::pi() / ParameterExpression::constant(2.0);
        self.u(half_pi, phi, lambda, qubit)
    }

    /// Apply u3(θ, φ, λ), the legacy name for the U gate.
    pub fn u3(
        &mut self,
        theta: impl Into<ParameterExpression>,
        phi: impl Into<ParameterExpression>,
        lambda: impl Into<ParameterExpression>,
        qubit: QubitId,
    ) -> IrResult<&mut Self> {
        self.u(theta, phi, lambda, qubit)
    }

    // =========================================================================
    // Two-qubit gates
    // =========================================================================

    /// Apply CNOT (CX) gate.
    pub fn cx(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::two_qubit_gate(StandardGate::CX, control, target))
    }

    /// Apply controlled-Y gate.
    pub fn cy(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::two_qubit_gate(StandardGate::CY, control, target))
    }

    /// Apply controlled-Z gate.
    pub fn cz(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::two_qubit_gate(StandardGate::CZ, control, target))
    }

    /// Apply controlled-Hadamard gate.
    pub fn ch(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::two_qubit_gate(StandardGate::CH, control, target))
    }

    /// Apply SWAP gate.
    pub fn swap(&mut self, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::two_qubit_gate(StandardGate::Swap, q1, q2))
    }

    /// Apply iSWAP gate.
    pub fn iswap(&mut self, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::two_qubit_gate(StandardGate::ISwap, q1, q2))
    }

    /// Apply controlled-Rz gate.
    pub fn crz(
        &mut self,
        theta: impl Into<ParameterExpression>,
        control: QubitId,
        target: QubitId,
    ) -> IrResult<&mut Self> {
        self.append(Instruction::two_qubit_gate(
            StandardGate::CRz(theta.into()),
            control,
            target,
        ))
    }

    /// Apply controlled-phase gate.
    pub fn cp(
        &mut self,
        theta: impl Into<ParameterExpression>,
        control: QubitId,
        target: QubitId,
    ) -> IrResult<&mut Self> {
        self.append(Instruction::two_qubit_gate(
            StandardGate::CP(theta.into()),
            control,
            target,
        ))
    }

    /// Apply cu1, the legacy name for the controlled-phase gate.
    pub fn cu1(
        &mut self,
        theta: impl Into<ParameterExpression>,
        control: QubitId,
        target: QubitId,
    ) -> IrResult<&mut Self> {
        self.cp(theta, control, target)
    }

    // =========================================================================
    // Three-qubit gates
    // =========================================================================

    /// Apply Toffoli (CCX) gate.
    pub fn ccx(&mut self, c1: QubitId, c2: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::gate(StandardGate::CCX, [c1, c2, target]))
    }

    /// Apply Fredkin (CSWAP) gate.
    pub fn cswap(&mut self, control: QubitId, t1: QubitId, t2: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::gate(StandardGate::CSwap, [control, t1, t2]))
    }

    // =========================================================================
    // Conditioned gates and other operations
    // =========================================================================

    /// Apply a gate only when a classical register holds the given value.
    pub fn gate_if(
        &mut self,
        gate: StandardGate,
        qubits: impl IntoIterator<Item = QubitId>,
        condition: ClassicalCondition,
    ) -> IrResult<&mut Self> {
        self.append(Instruction::gate(
            Gate::new(gate).with_condition(condition),
            qubits,
        ))
    }

    /// Measure a qubit into a classical bit.
    pub fn measure(&mut self, qubit: QubitId, clbit: ClbitId) -> IrResult<&mut Self> {
        self.append(Instruction::measure(qubit, clbit))
    }

    /// Measure every qubit into the classical bit with the same index,
    /// growing the classical side if needed.
    pub fn measure_all(&mut self) -> IrResult<&mut Self> {
        while self.clbits.len() < self.qubits.len() {
            self.add_clbit();
        }
        let qubits: Vec<_> = self.qubits.iter().map(|q| q.id).collect();
        let clbits: Vec<_> = self
            .clbits
            .iter()
            .take(qubits.len())
            .map(|c| c.id)
            .collect();
        self.append(Instruction::measure_many(qubits, clbits))
    }

    /// Reset a qubit to |0⟩.
    pub fn reset(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.append(Instruction::reset(qubit))
    }

    /// Apply a barrier to the given qubits.
    pub fn barrier(&mut self, qubits: impl IntoIterator<Item = QubitId>) -> IrResult<&mut Self> {
        self.append(Instruction::barrier(qubits))
    }

    /// Record a statevector snapshot under a label.
    pub fn snapshot(&mut self, label: impl Into<String>) -> IrResult<&mut Self> {
        self.append(Instruction::snapshot(label))
    }

    // =========================================================================
    // Parameter binding
    // =========================================================================

    /// Whether any gate still carries an unbound symbolic angle.
    pub fn is_parameterized(&self) -> bool {
        self.instructions
            .iter()
            .filter_map(Instruction::as_gate)
            .any(|g| g.gate.is_parameterized())
    }

    /// All unbound symbol names in the circuit, sorted.
    pub fn parameters(&self) -> BTreeSet<String> {
        let mut set = BTreeSet::new();
        for gate in self.instructions.iter().filter_map(Instruction::as_gate) {
            for p in gate.gate.parameters() {
                set.extend(p.symbols());
            }
        }
        set
    }

    /// Return a copy with symbols from `bindings` substituted.
    ///
    /// Symbols not present in `bindings` stay symbolic; backends reject
    /// circuits that still carry symbols at submit time.
    #[must_use]
    pub fn bind_parameters(&self, bindings: &FxHashMap<String, f64>) -> Self {
        let mut bound = self.clone();
        for instruction in &mut bound.instructions {
            if let InstructionKind::Gate(gate) = &mut instruction.kind {
                gate.gate = gate.gate.bind(bindings);
            }
        }
        bound
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.qubits.len()
    }

    /// Number of classical bits.
    pub fn num_clbits(&self) -> usize {
        self.clbits.len()
    }

    /// The qubits of the circuit.
    pub fn qubits(&self) -> &[Qubit] {
        &self.qubits
    }

    /// The classical bits of the circuit.
    pub fn clbits(&self) -> &[Clbit] {
        &self.clbits
    }

    /// Classical registers in declaration order.
    pub fn cregs(&self) -> &[CregLayout] {
        &self.cregs
    }

    /// The instruction sequence, in program order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Whether the circuit contains any measurement.
    pub fn has_measurements(&self) -> bool {
        self.instructions.iter().any(Instruction::is_measure)
    }

    /// Circuit depth: longest chain of instructions over any wire.
    /// Barriers synchronize but do not count as a layer.
    pub fn depth(&self) -> usize {
        let mut qubit_frontier = vec![0usize; self.qubits.len()];
        let mut clbit_frontier = vec![0usize; self.clbits.len()];

        for instruction in &self.instructions {
            let level = instruction
                .qubits
                .iter()
                .map(|q| qubit_frontier[q.index()])
                .chain(instruction.clbits.iter().map(|c| clbit_frontier[c.index()]))
                .max()
                .unwrap_or(0);
            let level = if instruction.is_barrier() || instruction.is_snapshot() {
                level
            } else {
                level + 1
            };
            for q in &instruction.qubits {
                qubit_frontier[q.index()] = level;
            }
            for c in &instruction.clbits {
                clbit_frontier[c.index()] = level;
            }
        }

        qubit_frontier
            .into_iter()
            .chain(clbit_frontier)
            .max()
            .unwrap_or(0)
    }

    // =========================================================================
    // Prebuilt circuits
    // =========================================================================

    /// A Bell state circuit with measurements.
    pub fn bell() -> IrResult<Self> {
        let mut circuit = Self::with_size("bell", 2, 2);
        circuit
            .h(QubitId(0))?
            .cx(QubitId(0), QubitId(1))?
            .measure(QubitId(0), ClbitId(0))?
            .measure(QubitId(1), ClbitId(1))?;
        Ok(circuit)
    }

    /// An n-qubit GHZ state circuit with measurements.
    pub fn ghz(n: u32) -> IrResult<Self> {
        if n == 0 {
            return Ok(Self::new("ghz_0"));
        }
        let mut circuit = Self::with_size("ghz", n, n);
        circuit.h(QubitId(0))?;
        for i in 0..n - 1 {
            circuit.cx(QubitId(i), QubitId(i + 1))?;
        }
        for i in 0..n {
            circuit.measure(QubitId(i), ClbitId(i))?;
        }
        Ok(circuit)
    }

    /// An n-qubit Quantum Fourier Transform, without measurements.
    pub fn qft(n: u32) -> IrResult<Self> {
        use std::f64::consts::PI;

        if n == 0 {
            return Ok(Self::new("qft_0"));
        }
        let mut circuit = Self::with_size("qft", n, 0);
        for i in 0..n {
            circuit.h(QubitId(i))?;
            for j in (i + 1)..n {
                let angle = PI / (1u64 << (j - i)) as f64;
                circuit.cp(angle, QubitId(j), QubitId(i))?;
            }
        }
        for i in 0..n / 2 {
            circuit.swap(QubitId(i), QubitId(n - 1 - i))?;
        }
        Ok(circuit)
    }
}
