//! QFT benchmark harness for the local simulator backends.
//!
//! Times Quantum Fourier Transform circuits of growing width against the
//! statevector and qasm backends, either as a sweep over widths (CSV
//! output) or repeatedly at a single width (summary statistics). The
//! CLI binary in this crate drives both modes.

pub mod stats;

use rand::Rng;
use rand::rngs::SmallRng;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::time::Instant;
use tracing::debug;

use skoll_adapter_local::{QasmBackend, StatevectorBackend};
use skoll_hal::{Backend, HalResult};
use skoll_ir::Circuit;

pub use stats::SampleStats;

/// Warm-up samples discarded in single-width mode.
pub const BURN_IN_SAMPLES: usize = 5;

/// Which backend a sample was taken against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BenchTarget {
    /// The statevector simulator, single shot.
    Statevector,
    /// The qasm simulator at the configured shot count.
    Qasm,
}

impl BenchTarget {
    /// Column name used in reports.
    pub fn name(self) -> &'static str {
        match self {
            BenchTarget::Statevector => "statevector_simulator",
            BenchTarget::Qasm => "qasm_simulator",
        }
    }

    fn pick(rng: &mut SmallRng) -> Self {
        if rng.gen_bool(0.5) {
            BenchTarget::Statevector
        } else {
            BenchTarget::Qasm
        }
    }
}

/// One timing sample from a sweep.
#[derive(Debug, Clone, Serialize)]
pub struct SweepRecord {
    /// Backend the sample ran on.
    pub backend: &'static str,
    /// Circuit width.
    pub num_qubits: u32,
    /// Wall-clock execution time in seconds.
    pub seconds: f64,
}

impl SweepRecord {
    /// CSV header matching [`SweepRecord::csv_row`].
    pub const CSV_HEADER: &'static str = "name,num_qubits,time";

    /// The record as a CSV row.
    pub fn csv_row(&self) -> String {
        format!("{},{},{}", self.backend, self.num_qubits, self.seconds)
    }
}

/// Both backends, constructed once per harness run.
struct Harness {
    statevector: StatevectorBackend,
    qasm: QasmBackend,
    shots: u32,
}

impl Harness {
    fn new(shots: u32) -> Self {
        Self {
            statevector: StatevectorBackend::new(),
            qasm: QasmBackend::new(),
            shots,
        }
    }

    /// Time one submit-and-wait round trip.
    async fn time(&self, target: BenchTarget, circuit: &Circuit) -> HalResult<f64> {
        let start = Instant::now();
        match target {
            BenchTarget::Statevector => {
                let job_id = self.statevector.submit(circuit, 1, None).await?;
                self.statevector.wait(&job_id).await?;
            }
            BenchTarget::Qasm => {
                let job_id = self.qasm.submit(circuit, self.shots, None).await?;
                self.qasm.wait(&job_id).await?;
            }
        }
        Ok(start.elapsed().as_secs_f64())
    }
}

/// Sweep widths `2..=max_qubits`, taking `samples` timings per width on
/// randomly chosen backends. `on_sample` is invoked after every sample,
/// for progress reporting.
pub async fn run_sweep(
    max_qubits: u32,
    samples: u32,
    shots: u32,
    rng: &mut SmallRng,
    mut on_sample: impl FnMut(),
) -> HalResult<Vec<SweepRecord>> {
    let harness = Harness::new(shots);
    let mut records = vec![];

    for num_qubits in 2..=max_qubits {
        let circuit = Circuit::qft(num_qubits)
            .map_err(|e| skoll_hal::HalError::InvalidCircuit(e.to_string()))?;
        debug!(num_qubits, "benchmarking width");

        for _ in 0..samples {
            let target = BenchTarget::pick(rng);
            let seconds = harness.time(target, &circuit).await?;
            records.push(SweepRecord {
                backend: target.name(),
                num_qubits,
                seconds,
            });
            on_sample();
        }
    }

    Ok(records)
}

/// Benchmark a single width, discarding `burn` warm-up samples, and
/// return per-backend timing samples.
pub async fn run_single(
    num_qubits: u32,
    samples: u32,
    burn: usize,
    shots: u32,
    rng: &mut SmallRng,
    mut on_sample: impl FnMut(),
) -> HalResult<FxHashMap<&'static str, Vec<f64>>> {
    let harness = Harness::new(shots);
    let circuit = Circuit::qft(num_qubits)
        .map_err(|e| skoll_hal::HalError::InvalidCircuit(e.to_string()))?;

    let mut timings: FxHashMap<&'static str, Vec<f64>> = FxHashMap::default();
    let total = samples as usize + burn;

    for i in 0..total {
        let target = BenchTarget::pick(rng);
        let seconds = harness.time(target, &circuit).await?;
        if i >= burn {
            timings.entry(target.name()).or_default().push(seconds);
        }
        on_sample();
    }

    Ok(timings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn csv_row_format() {
        let record = SweepRecord {
            backend: "qasm_simulator",
            num_qubits: 7,
            seconds: 0.25,
        };
        assert_eq!(record.csv_row(), "qasm_simulator,7,0.25");
        assert_eq!(SweepRecord::CSV_HEADER.split(',').count(), 3);
    }

    #[tokio::test]
    async fn sweep_produces_samples_for_every_width() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut ticks = 0;
        let records = run_sweep(4, 2, 16, &mut rng, || ticks += 1).await.unwrap();

        // Widths 2, 3, 4 at 2 samples each.
        assert_eq!(records.len(), 6);
        assert_eq!(ticks, 6);
        for record in &records {
            assert!(record.seconds >= 0.0);
            assert!((2..=4).contains(&record.num_qubits));
        }
    }

    #[tokio::test]
    async fn single_mode_discards_burn_in() {
        let mut rng = SmallRng::seed_from_u64(2);
        let mut ticks = 0;
        let timings = run_single(3, 4, 2, 16, &mut rng, || ticks += 1)
            .await
            .unwrap();

        assert_eq!(ticks, 6);
        let kept: usize = timings.values().map(Vec::len).sum();
        assert_eq!(kept, 4);
    }

    #[tokio::test]
    async fn stats_over_single_run() {
        let mut rng = SmallRng::seed_from_u64(3);
        let timings = run_single(3, 6, 0, 16, &mut rng, || {}).await.unwrap();
        for samples in timings.values() {
            let stats = SampleStats::from_samples(samples).unwrap();
            assert!(stats.mean >= 0.0);
            assert_eq!(stats.count, samples.len());
        }
    }
}
