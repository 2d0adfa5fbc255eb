use serde::{Deserialize, Serialize};

use crate::error::{Result, RiskError};

/// Summary of a raw input sample, reported alongside the fitted parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DescriptiveStats {
    pub mean: f64,
    pub median: f64,
    /// Population variance (divisor n).
    pub variance: f64,
}

/// Location/scale of the underlying normal: X = exp(N(mu, sigma²)).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogNormalParams {
    pub mu: f64,
    pub sigma: f64,
}

fn check_sample(sample: &[f64], what: &str) -> Result<()> {
    if sample.is_empty() {
        return Err(RiskError::Input(format!("{what}: empty sample")));
    }
    if let Some(i) = sample.iter().position(|x| !x.is_finite()) {
        return Err(RiskError::Input(format!(
            "{what}: non-finite value {} at position {}",
            sample[i],
            i + 1
        )));
    }
    Ok(())
}

fn mean(sample: &[f64]) -> f64 {
    sample.iter().sum::<f64>() / sample.len() as f64
}

fn population_variance(sample: &[f64], mean: f64) -> f64 {
    sample.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / sample.len() as f64
}

/// Median of an ascending, non-empty slice.
fn median_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    }
}

pub fn describe_stats(sample: &[f64]) -> Result<DescriptiveStats> {
    check_sample(sample, "describe_stats")?;
    let mut sorted = sample.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mean = mean(&sorted);
    Ok(DescriptiveStats {
        mean,
        median: median_sorted(&sorted),
        variance: population_variance(&sorted, mean),
    })
}

/// Method-of-moments Poisson λ: the sample mean of per-period event counts.
pub fn poisson_rate(sample: &[f64]) -> Result<f64> {
    check_sample(sample, "poisson_rate")?;
    if let Some(i) = sample.iter().position(|&x| x < 0.0) {
        return Err(RiskError::Domain(format!(
            "poisson_rate: negative event count {} at position {}",
            sample[i],
            i + 1
        )));
    }
    Ok(mean(sample))
}

/// Fit a LogNormal by the mean and population standard deviation of ln(x).
///
/// Every value must be strictly positive; the log of zero or a negative loss
/// is undefined and is reported as a domain error rather than propagated as
/// NaN or -inf.
pub fn lognormal_params(sample: &[f64]) -> Result<LogNormalParams> {
    check_sample(sample, "lognormal_params")?;
    if let Some(i) = sample.iter().position(|&x| x <= 0.0) {
        return Err(RiskError::Domain(format!(
            "lognormal_params: value {} at position {} is not strictly positive",
            sample[i],
            i + 1
        )));
    }

    let logs: Vec<f64> = sample.iter().map(|x| x.ln()).collect();
    let mu = mean(&logs);
    Ok(LogNormalParams {
        mu,
        sigma: population_variance(&logs, mu).sqrt(),
    })
}
