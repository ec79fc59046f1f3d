//! Error types for circuit construction.

use crate::qubit::{ClbitId, QubitId};
use thiserror::Error;

/// Errors that can occur while building a circuit.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// Qubit is not part of the circuit.
    #[error("qubit {qubit} out of range for circuit with {num_qubits} qubits (gate: {gate})")]
    QubitOutOfRange {
        /// The offending qubit.
        qubit: QubitId,
        /// Number of qubits in the circuit.
        num_qubits: usize,
        /// Name of the operation being applied.
        gate: String,
    },

    /// Classical bit is not part of the circuit.
    #[error("classical bit {clbit} out of range for circuit with {num_clbits} bits")]
    ClbitOutOfRange {
        /// The offending classical bit.
        clbit: ClbitId,
        /// Number of classical bits in the circuit.
        num_clbits: usize,
    },

    /// The same qubit appears twice in one operation.
    #[error("duplicate qubit {qubit} in operation '{gate}'")]
    DuplicateQubit {
        /// The duplicate qubit.
        qubit: QubitId,
        /// Name of the operation being applied.
        gate: String,
    },

    /// Operand count does not match the gate arity.
    #[error("gate '{gate}' takes {expected} qubits, got {got}")]
    QubitCountMismatch {
        /// Name of the gate.
        gate: String,
        /// Expected number of qubits.
        expected: u32,
        /// Number of qubits provided.
        got: u32,
    },

    /// Measurement operand lists have different lengths.
    #[error("measurement maps {qubits} qubits onto {clbits} classical bits")]
    MeasureArityMismatch {
        /// Number of qubits being measured.
        qubits: usize,
        /// Number of classical bits receiving outcomes.
        clbits: usize,
    },
}

/// Result type for circuit construction.
pub type IrResult<T> = Result<T, IrError>;
