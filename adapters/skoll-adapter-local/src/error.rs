//! Simulator-level errors.

use skoll_hal::HalError;
use thiserror::Error;

/// Errors raised inside the local simulation engine.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SimulatorError {
    /// Circuit is wider than the backend allows.
    #[error("cannot simulate {requested} qubits (limit {max})")]
    TooManyQubits {
        /// Qubits in the circuit.
        requested: usize,
        /// Backend limit.
        max: u32,
    },

    /// More classical bits than the packed classical state can hold.
    #[error("cannot track {requested} classical bits (limit {max})")]
    TooManyClbits {
        /// Classical bits in the circuit.
        requested: usize,
        /// Backend limit.
        max: u32,
    },

    /// The backend does not execute this operation.
    #[error("{backend} encountered unsupported operation '{op}'")]
    UnsupportedOperation {
        /// Backend name.
        backend: String,
        /// Operation name.
        op: String,
    },

    /// Symbolic angles survived parameter binding.
    #[error("circuit has unbound parameters: {0}")]
    UnboundParameters(String),

    /// A conditional gate names a register the circuit does not declare.
    #[error("conditional gate references unknown classical register '{0}'")]
    UnknownConditionRegister(String),
}

impl From<SimulatorError> for HalError {
    fn from(err: SimulatorError) -> Self {
        match err {
            SimulatorError::TooManyQubits { .. } => HalError::CircuitTooLarge(err.to_string()),
            SimulatorError::UnsupportedOperation { .. } | SimulatorError::TooManyClbits { .. } => {
                HalError::Unsupported(err.to_string())
            }
            SimulatorError::UnboundParameters(_)
            | SimulatorError::UnknownConditionRegister(_) => {
                HalError::InvalidCircuit(err.to_string())
            }
        }
    }
}
