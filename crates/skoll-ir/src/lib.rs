//! Sköll Circuit Intermediate Representation
//!
//! The circuit object that crosses the provider boundary: a validated,
//! sequential instruction list with register-aware qubit and classical-bit
//! addressing, a standard gate vocabulary, and symbolic parameters.
//!
//! # Example: Building a Bell State
//!
//! ```rust
//! use skoll_ir::{Circuit, QubitId, ClbitId};
//!
//! let mut circuit = Circuit::with_size("bell_state", 2, 2);
//! circuit.h(QubitId(0)).unwrap();
//! circuit.cx(QubitId(0), QubitId(1)).unwrap();
//! circuit.measure(QubitId(0), ClbitId(0)).unwrap();
//! circuit.measure(QubitId(1), ClbitId(1)).unwrap();
//!
//! assert_eq!(circuit.num_qubits(), 2);
//! assert_eq!(circuit.depth(), 3);
//! ```
//!
//! # Example: Parameterized Circuit
//!
//! ```rust
//! use rustc_hash::FxHashMap;
//! use skoll_ir::{Circuit, ParameterExpression, QubitId};
//! use std::f64::consts::PI;
//!
//! let mut circuit = Circuit::with_size("variational", 1, 0);
//! circuit.rx(ParameterExpression::symbol("theta"), QubitId(0)).unwrap();
//!
//! let mut bindings = FxHashMap::default();
//! bindings.insert("theta".to_string(), PI / 4.0);
//! let bound = circuit.bind_parameters(&bindings);
//! assert!(!bound.is_parameterized());
//! ```

pub mod circuit;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod parameter;
pub mod qubit;

pub use circuit::Circuit;
pub use error::{IrError, IrResult};
pub use gate::{ClassicalCondition, Gate, StandardGate};
pub use instruction::{Instruction, InstructionKind};
pub use parameter::ParameterExpression;
pub use qubit::{Clbit, ClbitId, CregLayout, Qubit, QubitId};
