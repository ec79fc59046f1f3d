//! Circuit instructions: gates plus their operands.

use serde::{Deserialize, Serialize};

use crate::gate::{Gate, StandardGate};
use crate::qubit::{ClbitId, QubitId};

/// The kind of instruction in a circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InstructionKind {
    /// A gate application.
    Gate(Gate),
    /// Measurement into classical bits.
    Measure,
    /// Reset qubit to |0⟩.
    Reset,
    /// Barrier (no effect on simulation; kept for circuit fidelity).
    Barrier,
    /// Record the full statevector under a label.
    Snapshot {
        /// Label the snapshot is stored under in the result.
        label: String,
    },
}

/// A complete instruction with operands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    /// The kind of instruction.
    pub kind: InstructionKind,
    /// Qubit operands.
    pub qubits: Vec<QubitId>,
    /// Classical bit operands (measurement targets).
    pub clbits: Vec<ClbitId>,
}

impl Instruction {
    /// A gate instruction.
    pub fn gate(gate: impl Into<Gate>, qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self {
            kind: InstructionKind::Gate(gate.into()),
            qubits: qubits.into_iter().collect(),
            clbits: vec![],
        }
    }

    /// A single-qubit gate instruction.
    pub fn single_qubit_gate(gate: StandardGate, qubit: QubitId) -> Self {
        Self::gate(gate, [qubit])
    }

    /// A two-qubit gate instruction.
    pub fn two_qubit_gate(gate: StandardGate, q1: QubitId, q2: QubitId) -> Self {
        Self::gate(gate, [q1, q2])
    }

    /// A single measurement.
    pub fn measure(qubit: QubitId, clbit: ClbitId) -> Self {
        Self {
            kind: InstructionKind::Measure,
            qubits: vec![qubit],
            clbits: vec![clbit],
        }
    }

    /// A parallel measurement of several qubits.
    ///
    /// The i-th qubit is measured into the i-th classical bit.
    pub fn measure_many(qubits: Vec<QubitId>, clbits: Vec<ClbitId>) -> Self {
        Self {
            kind: InstructionKind::Measure,
            qubits,
            clbits,
        }
    }

    /// A reset instruction.
    pub fn reset(qubit: QubitId) -> Self {
        Self {
            kind: InstructionKind::Reset,
            qubits: vec![qubit],
            clbits: vec![],
        }
    }

    /// A barrier over the given qubits.
    pub fn barrier(qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self {
            kind: InstructionKind::Barrier,
            qubits: qubits.into_iter().collect(),
            clbits: vec![],
        }
    }

    /// A statevector snapshot.
    pub fn snapshot(label: impl Into<String>) -> Self {
        Self {
            kind: InstructionKind::Snapshot {
                label: label.into(),
            },
            qubits: vec![],
            clbits: vec![],
        }
    }

    /// Whether this is a gate instruction.
    pub fn is_gate(&self) -> bool {
        matches!(self.kind, InstructionKind::Gate(_))
    }

    /// Whether this is a measurement.
    pub fn is_measure(&self) -> bool {
        matches!(self.kind, InstructionKind::Measure)
    }

    /// Whether this is a reset.
    pub fn is_reset(&self) -> bool {
        matches!(self.kind, InstructionKind::Reset)
    }

    /// Whether this is a barrier.
    pub fn is_barrier(&self) -> bool {
        matches!(self.kind, InstructionKind::Barrier)
    }

    /// Whether this is a snapshot.
    pub fn is_snapshot(&self) -> bool {
        matches!(self.kind, InstructionKind::Snapshot { .. })
    }

    /// Whether this instruction carries a classical condition.
    pub fn is_conditional(&self) -> bool {
        matches!(&self.kind, InstructionKind::Gate(g) if g.condition.is_some())
    }

    /// The gate, if this is a gate instruction.
    pub fn as_gate(&self) -> Option<&Gate> {
        match &self.kind {
            InstructionKind::Gate(g) => Some(g),
            _ => None,
        }
    }

    /// Name of the instruction.
    pub fn name(&self) -> &str {
        match &self.kind {
            InstructionKind::Gate(g) => g.name(),
            InstructionKind::Measure => "measure",
            InstructionKind::Reset => "reset",
            InstructionKind::Barrier => "barrier",
            InstructionKind::Snapshot { .. } => "snapshot",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_instruction() {
        let inst = Instruction::single_qubit_gate(StandardGate::H, QubitId(0));
        assert!(inst.is_gate());
        assert!(!inst.is_conditional());
        assert_eq!(inst.name(), "h");
    }

    #[test]
    fn measure_instruction() {
        let inst = Instruction::measure(QubitId(0), ClbitId(0));
        assert!(inst.is_measure());
        assert_eq!(inst.qubits.len(), 1);
        assert_eq!(inst.clbits.len(), 1);
    }

    #[test]
    fn reset_instruction() {
        let inst = Instruction::reset(QubitId(2));
        assert!(inst.is_reset());
        assert_eq!(inst.name(), "reset");
        assert!(inst.clbits.is_empty());
    }

    #[test]
    fn snapshot_instruction() {
        let inst = Instruction::snapshot("after_h");
        assert!(inst.is_snapshot());
        assert_eq!(inst.name(), "snapshot");
        assert!(inst.qubits.is_empty());
    }

    #[test]
    fn conditional_instruction() {
        use crate::gate::{ClassicalCondition, Gate};
        let inst = Instruction::gate(
            Gate::new(StandardGate::X).with_condition(ClassicalCondition::new("c", 1)),
            [QubitId(0)],
        );
        assert!(inst.is_conditional());
    }
}
