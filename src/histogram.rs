use serde::{Deserialize, Serialize};

use crate::error::{Result, RiskError};

/// Equal-width probability-density histogram of a loss sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    /// `bins + 1` ascending bin edges from min to max.
    pub edges: Vec<f64>,
    pub counts: Vec<u64>,
    /// count / (n · width); integrates to 1 over the edges.
    pub densities: Vec<f64>,
}

impl Histogram {
    /// Bins are half-open `[lo, hi)` except the last, which also takes the
    /// sample maximum.
    pub fn build(sample: &[f64], bins: usize) -> Result<Self> {
        if sample.is_empty() {
            return Err(RiskError::Input("histogram: empty sample".to_string()));
        }
        if bins == 0 {
            return Err(RiskError::Input("histogram: bin count must be > 0".to_string()));
        }
        let lo = sample.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = sample.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if !lo.is_finite() || !hi.is_finite() {
            return Err(RiskError::Input("histogram: non-finite sample value".to_string()));
        }
        if hi <= lo {
            return Err(RiskError::DegenerateData(format!(
                "histogram: all {} values equal {lo}",
                sample.len()
            )));
        }

        let width = (hi - lo) / bins as f64;
        let mut counts = vec![0u64; bins];
        for &x in sample {
            let idx = (((x - lo) / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }

        let n = sample.len() as f64;
        let edges = (0..=bins).map(|i| lo + width * i as f64).collect();
        let densities = counts.iter().map(|&c| c as f64 / (n * width)).collect();
        Ok(Histogram { edges, counts, densities })
    }

    pub fn bin_width(&self) -> f64 {
        self.edges[1] - self.edges[0]
    }
}
