use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rand_distr::{Distribution, LogNormal, Poisson};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RiskError};
use crate::stats::LogNormalParams;

/// Trials drawn per rng stream in [`simulate_par`].
const PAR_CHUNK: usize = 1_024;

/// Fitted frequency/severity model for one risk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistributionParameters {
    /// Poisson λ: expected number of events per period.
    pub rate: f64,
    /// LogNormal severity; ln-space params.
    pub severity: LogNormalParams,
}

impl DistributionParameters {
    pub fn new(rate: f64, mu: f64, sigma: f64) -> Result<Self> {
        if !rate.is_finite() || rate < 0.0 {
            return Err(RiskError::Domain(format!(
                "Poisson rate must be finite and >= 0, got {rate}"
            )));
        }
        if !mu.is_finite() {
            return Err(RiskError::Domain(format!("LogNormal mu must be finite, got {mu}")));
        }
        if !sigma.is_finite() || sigma < 0.0 {
            return Err(RiskError::Domain(format!(
                "LogNormal sigma must be finite and >= 0, got {sigma}"
            )));
        }
        Ok(DistributionParameters { rate, severity: LogNormalParams { mu, sigma } })
    }

    /// Analytic expected loss per period: λ · E[X] = λ · exp(mu + sigma²/2).
    pub fn inherent_loss(&self) -> f64 {
        let LogNormalParams { mu, sigma } = self.severity;
        self.rate * (mu + sigma * sigma / 2.0).exp()
    }
}

/// Pre-built distributions for one risk. `frequency` is `None` when λ = 0,
/// which `Poisson::new` rejects but which simply means "no events".
#[derive(Debug, Clone)]
pub struct LossSampler {
    frequency: Option<Poisson<f64>>,
    severity: LogNormal<f64>,
}

impl LossSampler {
    pub fn new(params: &DistributionParameters) -> Result<Self> {
        let frequency = if params.rate > 0.0 {
            let poisson = Poisson::new(params.rate).map_err(|e| {
                RiskError::Domain(format!("invalid Poisson rate {}: {e}", params.rate))
            })?;
            Some(poisson)
        } else {
            None
        };
        let LogNormalParams { mu, sigma } = params.severity;
        let severity = LogNormal::new(mu, sigma)
            .map_err(|e| RiskError::Domain(format!("invalid LogNormal ({mu}, {sigma}): {e}")))?;
        Ok(LossSampler { frequency, severity })
    }

    /// One period's loss: event count times a single severity draw.
    ///
    /// The severity is drawn once and scaled by the count rather than summed
    /// over events, so the period mean is exactly λ · E[X] and matches
    /// [`DistributionParameters::inherent_loss`].
    pub fn sample(&self, rng: &mut impl Rng) -> f64 {
        let count = self.frequency.as_ref().map_or(0.0, |p| p.sample(rng));
        let magnitude = self.severity.sample(rng);
        if count == 0.0 { 0.0 } else { count * magnitude }
    }
}

/// Draw `trials` independent period losses from a single rng.
pub fn simulate(
    params: &DistributionParameters,
    trials: usize,
    rng: &mut impl Rng,
) -> Result<Vec<f64>> {
    let sampler = LossSampler::new(params)?;
    Ok((0..trials).map(|_| sampler.sample(rng)).collect())
}

/// Parallel variant of [`simulate`].
///
/// Trials are split into fixed-size chunks; chunk `c` draws from
/// `ChaCha20Rng::seed_from_u64(seed)` on stream `c`, so the output depends
/// only on `seed` and `trials`, never on the rayon thread count.
pub fn simulate_par(params: &DistributionParameters, trials: usize, seed: u64) -> Result<Vec<f64>> {
    let sampler = &LossSampler::new(params)?;
    let chunks = trials.div_ceil(PAR_CHUNK);
    let losses = (0..chunks)
        .into_par_iter()
        .flat_map_iter(|c| {
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            rng.set_stream(c as u64);
            let len = PAR_CHUNK.min(trials - c * PAR_CHUNK);
            (0..len).map(move |_| sampler.sample(&mut rng))
        })
        .collect();
    Ok(losses)
}
