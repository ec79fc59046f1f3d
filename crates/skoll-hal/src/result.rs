//! Execution results returned by backends.

use num_complex::Complex64;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Measurement outcome counts, keyed by formatted bitstring.
///
/// Keys follow the host framework's convention: one group per classical
/// register, space-separated, with the later-declared register leftmost.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts(FxHashMap<String, u64>);

impl Counts {
    /// An empty counts table.
    pub fn new() -> Self {
        Self(FxHashMap::default())
    }

    /// Record one occurrence of an outcome.
    pub fn record(&mut self, bitstring: impl Into<String>) {
        *self.0.entry(bitstring.into()).or_insert(0) += 1;
    }

    /// Record `n` occurrences of an outcome.
    pub fn record_many(&mut self, bitstring: impl Into<String>, n: u64) {
        *self.0.entry(bitstring.into()).or_insert(0) += n;
    }

    /// Occurrences of an outcome (zero if never seen).
    pub fn get(&self, bitstring: &str) -> u64 {
        self.0.get(bitstring).copied().unwrap_or(0)
    }

    /// The most frequent outcome, if any.
    pub fn most_frequent(&self) -> Option<(&str, u64)> {
        self.0
            .iter()
            .max_by_key(|&(_, &count)| count)
            .map(|(k, &v)| (k.as_str(), v))
    }

    /// Total number of recorded outcomes.
    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    /// Number of distinct outcomes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no outcome has been recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over (bitstring, count) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(k, &v)| (k.as_str(), v))
    }
}

/// Labelled statevector snapshots: label → one statevector per shot.
pub type Snapshots = FxHashMap<String, Vec<Vec<Complex64>>>;

/// The result of executing a circuit on a backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Measurement counts (empty for statevector runs).
    pub counts: Counts,
    /// Number of shots executed.
    pub shots: u32,
    /// Final amplitude vector, little-endian indexing
    /// (statevector backend only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statevector: Option<Vec<Complex64>>,
    /// Per-shot outcome bitstrings, in shot order (qasm backend with
    /// memory enabled).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<Vec<String>>,
    /// Labelled mid-circuit statevector snapshots.
    #[serde(default, skip_serializing_if = "Snapshots::is_empty")]
    pub snapshots: Snapshots,
    /// Seed used for outcome sampling, if the run was seeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Wall-clock execution time in milliseconds.
    pub execution_time_ms: u64,
}

impl ExecutionResult {
    /// A counts-based result.
    pub fn new(counts: Counts, shots: u32) -> Self {
        Self {
            counts,
            shots,
            statevector: None,
            memory: None,
            snapshots: Snapshots::default(),
            seed: None,
            execution_time_ms: 0,
        }
    }

    /// A statevector result (always a single shot).
    pub fn from_statevector(statevector: Vec<Complex64>) -> Self {
        Self {
            counts: Counts::new(),
            shots: 1,
            statevector: Some(statevector),
            memory: None,
            snapshots: Snapshots::default(),
            seed: None,
            execution_time_ms: 0,
        }
    }

    /// Attach per-shot memory.
    #[must_use]
    pub fn with_memory(mut self, memory: Vec<String>) -> Self {
        self.memory = Some(memory);
        self
    }

    /// Attach snapshots.
    #[must_use]
    pub fn with_snapshots(mut self, snapshots: Snapshots) -> Self {
        self.snapshots = snapshots;
        self
    }

    /// Record the sampling seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Record the execution time.
    #[must_use]
    pub fn with_execution_time(mut self, millis: u64) -> Self {
        self.execution_time_ms = millis;
        self
    }
}
