//! Sample statistics for benchmark timings.

use serde::Serialize;

/// Summary statistics over a set of timing samples.
#[derive(Debug, Clone, Serialize)]
pub struct SampleStats {
    /// Median sample value.
    pub median: f64,
    /// Arithmetic mean.
    pub mean: f64,
    /// Sample standard deviation (n-1), absent with fewer than two samples.
    pub stdev: Option<f64>,
    /// Number of samples.
    pub count: usize,
}

impl SampleStats {
    /// Compute statistics over the samples. Returns `None` when empty.
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        let mut sorted = samples.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).expect("timings are finite"));
        let mid = sorted.len() / 2;
        let median = if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        };

        let mean = samples.iter().sum::<f64>() / samples.len() as f64;

        let stdev = (samples.len() > 1).then(|| {
            let variance = samples
                .iter()
                .map(|s| (s - mean).powi(2))
                .sum::<f64>()
                / (samples.len() - 1) as f64;
            variance.sqrt()
        });

        Some(Self {
            median,
            mean,
            stdev,
            count: samples.len(),
        })
    }
}
