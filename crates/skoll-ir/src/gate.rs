//! Gate vocabulary.
//!
//! Every variant of [`StandardGate`] is implemented by the local simulation
//! engine; there is no gate that parses but silently does nothing.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::parameter::ParameterExpression;

/// The standard gate set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StandardGate {
    /// Identity gate.
    I,
    /// Pauli-X gate.
    X,
    /// Pauli-Y gate.
    Y,
    /// Pauli-Z gate.
    Z,
    /// Hadamard gate.
    H,
    /// S gate (sqrt(Z)).
    S,
    /// S-dagger gate.
    Sdg,
    /// T gate (fourth root of Z).
    T,
    /// T-dagger gate.
    Tdg,
    /// sqrt(X) gate.
    SX,
    /// sqrt(X)-dagger gate.
    SXdg,
    /// Rotation around X.
    Rx(ParameterExpression),
    /// Rotation around Y.
    Ry(ParameterExpression),
    /// Rotation around Z.
    Rz(ParameterExpression),
    /// Phase gate.
    P(ParameterExpression),
    /// Universal single-qubit gate U(θ, φ, λ).
    U(
        ParameterExpression,
        ParameterExpression,
        ParameterExpression,
    ),

    /// Controlled-X (CNOT) gate.
    CX,
    /// Controlled-Y gate.
    CY,
    /// Controlled-Z gate.
    CZ,
    /// Controlled-Hadamard gate.
    CH,
    /// SWAP gate.
    Swap,
    /// iSWAP gate.
    ISwap,
    /// Controlled rotation around Z.
    CRz(ParameterExpression),
    /// Controlled phase gate.
    CP(ParameterExpression),

    /// Toffoli gate (CCX).
    CCX,
    /// Fredkin gate (CSWAP).
    CSwap,
}

impl StandardGate {
    /// OpenQASM-style name of this gate.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::I => "id",
            StandardGate::X => "x",
            StandardGate::Y => "y",
            StandardGate::Z => "z",
            StandardGate::H => "h",
            StandardGate::S => "s",
            StandardGate::Sdg => "sdg",
            StandardGate::T => "t",
            StandardGate::Tdg => "tdg",
            StandardGate::SX => "sx",
            StandardGate::SXdg => "sxdg",
            StandardGate::Rx(_) => "rx",
            StandardGate::Ry(_) => "ry",
            StandardGate::Rz(_) => "rz",
            StandardGate::P(_) => "p",
            StandardGate::U(_, _, _) => "u",
            StandardGate::CX => "cx",
            StandardGate::CY => "cy",
            StandardGate::CZ => "cz",
            StandardGate::CH => "ch",
            StandardGate::Swap => "swap",
            StandardGate::ISwap => "iswap",
            StandardGate::CRz(_) => "crz",
            StandardGate::CP(_) => "cp",
            StandardGate::CCX => "ccx",
            StandardGate::CSwap => "cswap",
        }
    }

    /// Number of qubits this gate acts on.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            StandardGate::I
            | StandardGate::X
            | StandardGate::Y
            | StandardGate::Z
            | StandardGate::H
            | StandardGate::S
            | StandardGate::Sdg
            | StandardGate::T
            | StandardGate::Tdg
            | StandardGate::SX
            | StandardGate::SXdg
            | StandardGate::Rx(_)
            | StandardGate::Ry(_)
            | StandardGate::Rz(_)
            | StandardGate::P(_)
            | StandardGate::U(_, _, _) => 1,

            StandardGate::CX
            | StandardGate::CY
            | StandardGate::CZ
            | StandardGate::CH
            | StandardGate::Swap
            | StandardGate::ISwap
            | StandardGate::CRz(_)
            | StandardGate::CP(_) => 2,

            StandardGate::CCX | StandardGate::CSwap => 3,
        }
    }

    /// Whether any angle still contains an unbound symbol.
    pub fn is_parameterized(&self) -> bool {
        self.parameters().iter().any(|p| p.is_symbolic())
    }

    /// The angle expressions of this gate, in declaration order.
    pub fn parameters(&self) -> Vec<&ParameterExpression> {
        match self {
            StandardGate::Rx(p)
            | StandardGate::Ry(p)
            | StandardGate::Rz(p)
            | StandardGate::P(p)
            | StandardGate::CRz(p)
            | StandardGate::CP(p) => vec![p],
            StandardGate::U(a, b, c) => vec![a, b, c],
            _ => vec![],
        }
    }

    /// Substitute symbols from `bindings` in every angle expression.
    #[must_use]
    pub fn bind(&self, bindings: &FxHashMap<String, f64>) -> Self {
        match self {
            StandardGate::Rx(p) => StandardGate::Rx(p.bind(bindings)),
            StandardGate::Ry(p) => StandardGate::Ry(p.bind(bindings)),
            StandardGate::Rz(p) => StandardGate::Rz(p.bind(bindings)),
            StandardGate::P(p) => StandardGate::P(p.bind(bindings)),
            StandardGate::CRz(p) => StandardGate::CRz(p.bind(bindings)),
            StandardGate::CP(p) => StandardGate::CP(p.bind(bindings)),
            StandardGate::U(a, b, c) => {
                StandardGate::U(a.bind(bindings), b.bind(bindings), c.bind(bindings))
            }
            _ => self.clone(),
        }
    }

    /// All gate names, for building capability gate sets.
    pub fn all_names() -> &'static [&'static str] {
        &[
            "id", "x", "y", "z", "h", "s", "sdg", "t", "tdg", "sx", "sxdg", "rx", "ry", "rz", "p",
            "u", "cx", "cy", "cz", "ch", "swap", "iswap", "crz", "cp", "ccx", "cswap",
        ]
    }
}

/// Condition gating execution on a classical register value.
///
/// The gate fires only when the named register currently holds `value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassicalCondition {
    /// Name of the classical register.
    pub register: String,
    /// Required register value.
    pub value: u64,
}

impl ClassicalCondition {
    /// Create a new condition.
    pub fn new(register: impl Into<String>, value: u64) -> Self {
        Self {
            register: register.into(),
            value,
        }
    }
}

/// A gate application, possibly classically conditioned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    /// The gate being applied.
    pub gate: StandardGate,
    /// Optional classical condition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<ClassicalCondition>,
}

impl Gate {
    /// An unconditioned gate.
    pub fn new(gate: StandardGate) -> Self {
        Self {
            gate,
            condition: None,
        }
    }

    /// Attach a classical condition.
    #[must_use]
    pub fn with_condition(mut self, condition: ClassicalCondition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Name of the underlying gate.
    pub fn name(&self) -> &'static str {
        self.gate.name()
    }
}

impl From<StandardGate> for Gate {
    fn from(gate: StandardGate) -> Self {
        Gate::new(gate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn arities() {
        assert_eq!(StandardGate::H.num_qubits(), 1);
        assert_eq!(StandardGate::CX.num_qubits(), 2);
        assert_eq!(StandardGate::CCX.num_qubits(), 3);
    }

    #[test]
    fn parameterization() {
        assert!(!StandardGate::H.is_parameterized());
        assert!(!StandardGate::Rx(ParameterExpression::constant(PI)).is_parameterized());
        assert!(StandardGate::Rx(ParameterExpression::symbol("theta")).is_parameterized());
    }

    #[test]
    fn bind_resolves_symbols() {
        let gate = StandardGate::U(
            ParameterExpression::symbol("a"),
            ParameterExpression::constant(0.0),
            ParameterExpression::pi(),
        );
        let mut bindings = FxHashMap::default();
        bindings.insert("a".to_string(), PI / 2.0);
        let bound = gate.bind(&bindings);
        assert!(!bound.is_parameterized());
    }

    #[test]
    fn all_names_covers_every_variant() {
        // One name per variant, no duplicates.
        let names = StandardGate::all_names();
        let unique: std::collections::BTreeSet<_> = names.iter().collect();
        assert_eq!(names.len(), unique.len());
        assert_eq!(names.len(), 26);
    }

    #[test]
    fn conditioned_gate() {
        let gate = Gate::new(StandardGate::X).with_condition(ClassicalCondition::new("cr", 1));
        assert_eq!(gate.name(), "x");
        assert_eq!(gate.condition.as_ref().unwrap().value, 1);
    }
}
