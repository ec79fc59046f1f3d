//! Backend capability introspection.
//!
//! Describes what a backend can do: qubit count, supported gates,
//! connectivity, and shot limits. The provider surfaces this to callers
//! in place of an out-of-band configuration dictionary.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use skoll_ir::{Circuit, StandardGate};

/// Capabilities of a backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capabilities {
    /// Name of the backend.
    pub name: String,
    /// Number of qubits available.
    pub num_qubits: u32,
    /// Supported gate set.
    pub gate_set: GateSet,
    /// Qubit connectivity.
    pub topology: Topology,
    /// Maximum number of shots per job.
    pub max_shots: u32,
    /// Whether this is a simulator (`true`) vs real hardware (`false`).
    pub is_simulator: bool,
    /// Additional capability flags, e.g. `"statevector"`,
    /// `"conditional_gates"`, `"snapshots"`, `"memory"`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
}

impl Capabilities {
    /// Capabilities of a local simulator: universal gates, all-to-all
    /// connectivity.
    pub fn simulator(name: impl Into<String>, num_qubits: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            gate_set: GateSet::universal(),
            topology: Topology::full(num_qubits),
            max_shots: 100_000,
            is_simulator: true,
            features: vec![],
        }
    }

    /// Add a feature flag.
    #[must_use]
    pub fn with_feature(mut self, feature: impl Into<String>) -> Self {
        self.features.push(feature.into());
        self
    }

    /// Whether the feature flag is present.
    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.iter().any(|f| f == feature)
    }

    /// Gates in `circuit` that this backend does not support.
    pub fn unsupported_gates(&self, circuit: &Circuit) -> Vec<String> {
        let mut missing = BTreeSet::new();
        for instruction in circuit.instructions() {
            if let Some(gate) = instruction.as_gate() {
                if !self.gate_set.contains(gate.name()) {
                    missing.insert(gate.name().to_string());
                }
            }
        }
        missing.into_iter().collect()
    }
}

/// A set of supported gate names (OpenQASM naming).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateSet(BTreeSet<String>);

impl GateSet {
    /// An empty gate set.
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Every gate in the standard vocabulary.
    pub fn universal() -> Self {
        Self(
            StandardGate::all_names()
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        )
    }

    /// Build a gate set from names.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    /// Whether the gate name is supported.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    /// Number of supported gates.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over supported gate names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Default for GateSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Qubit connectivity of a backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    /// Shape of the connectivity graph.
    pub kind: TopologyKind,
    /// Number of qubits.
    pub num_qubits: u32,
}

/// Connectivity graph shapes. All edges are bidirectional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TopologyKind {
    /// Every qubit connects to every other (simulators).
    Full,
    /// Qubit i connects to qubit i+1.
    Linear,
}

impl Topology {
    /// All-to-all connectivity.
    pub fn full(num_qubits: u32) -> Self {
        Self {
            kind: TopologyKind::Full,
            num_qubits,
        }
    }

    /// Nearest-neighbour chain.
    pub fn linear(num_qubits: u32) -> Self {
        Self {
            kind: TopologyKind::Linear,
            num_qubits,
        }
    }

    /// The undirected edge list.
    pub fn edges(&self) -> Vec<(u32, u32)> {
        match self.kind {
            TopologyKind::Full => {
                let mut edges = vec![];
                for a in 0..self.num_qubits {
                    for b in (a + 1)..self.num_qubits {
                        edges.push((a, b));
                    }
                }
                edges
            }
            TopologyKind::Linear => (1..self.num_qubits).map(|b| (b - 1, b)).collect(),
        }
    }

    /// Whether a two-qubit interaction between `a` and `b` is direct.
    pub fn connected(&self, a: u32, b: u32) -> bool {
        if a == b || a >= self.num_qubits || b >= self.num_qubits {
            return false;
        }
        match self.kind {
            TopologyKind::Full => true,
            TopologyKind::Linear => a.abs_diff(b) == 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skoll_ir::QubitId;

    #[test]
    fn simulator_capabilities() {
        let caps = Capabilities::simulator("statevector_simulator", 25);
        assert!(caps.is_simulator);
        assert_eq!(caps.num_qubits, 25);
        assert!(caps.gate_set.contains("cx"));
        assert!(caps.gate_set.contains("u"));
        assert!(!caps.gate_set.contains("prx"));
        assert_eq!(caps.gate_set.len(), caps.gate_set.names().count());
    }

    #[test]
    fn feature_flags() {
        let caps = Capabilities::simulator("qasm_simulator", 25)
            .with_feature("conditional_gates")
            .with_feature("snapshots");
        assert!(caps.has_feature("snapshots"));
        assert!(!caps.has_feature("statevector"));
    }

    #[test]
    fn unsupported_gates_reported_once() {
        let caps = Capabilities {
            gate_set: GateSet::from_names(["h"]),
            ..Capabilities::simulator("limited", 2)
        };
        let mut circuit = Circuit::with_size("c", 2, 0);
        circuit.h(QubitId(0)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        circuit.cx(QubitId(1), QubitId(0)).unwrap();
        assert_eq!(caps.unsupported_gates(&circuit), vec!["cx".to_string()]);
    }

    #[test]
    fn full_topology_edges() {
        let topo = Topology::full(4);
        assert_eq!(topo.edges().len(), 6);
        assert!(topo.connected(0, 3));
        assert!(!topo.connected(2, 2));
    }

    #[test]
    fn linear_topology_edges() {
        let topo = Topology::linear(4);
        assert_eq!(topo.edges(), vec![(0, 1), (1, 2), (2, 3)]);
        assert!(topo.connected(1, 2));
        assert!(!topo.connected(0, 2));
    }
}
