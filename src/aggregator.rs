use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::SimulationConfig;
use crate::error::{Result, RiskError};
use crate::exceedance::ExceedanceCurve;
use crate::simulator::{self, DistributionParameters};
use crate::stats::{self, DescriptiveStats};
use crate::types::{RiskId, RiskRecordPair};

/// Everything reported for one risk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskReport {
    pub id: RiskId,
    pub event_stats: DescriptiveStats,
    pub loss_stats: DescriptiveStats,
    pub params: DistributionParameters,
    pub inherent_loss: f64,
    /// One entry per trial, in trial order.
    pub losses: Vec<f64>,
}

/// Range and centre of the simulated portfolio losses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LossSummary {
    pub min: f64,
    pub max: f64,
    /// (min + max) / 2. Historically printed as "Mean Expected Sim Loss".
    pub midrange: f64,
    /// Arithmetic mean over all trials.
    pub mean: f64,
}

impl LossSummary {
    /// `sorted` must be ascending and non-empty.
    fn from_sorted(sorted: &[f64]) -> Self {
        let min = sorted[0];
        let max = sorted[sorted.len() - 1];
        LossSummary {
            min,
            max,
            midrange: (min + max) / 2.0,
            mean: sorted.iter().sum::<f64>() / sorted.len() as f64,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioReport {
    pub risks: Vec<RiskReport>,
    pub total_inherent_loss: f64,
    pub summary: LossSummary,
    /// Portfolio loss per trial, sorted ascending.
    pub total_losses: Vec<f64>,
    pub curve: ExceedanceCurve,
}

impl PortfolioReport {
    /// (threshold, P(loss > threshold)) for each configured report threshold.
    pub fn threshold_probabilities(&self, thresholds: &[f64]) -> Vec<(f64, f64)> {
        thresholds.iter().map(|&t| (t, self.curve.probability_at(t))).collect()
    }
}

/// Fits, simulates and accumulates risks one at a time.
///
/// Trial k of every risk is taken to fall in the same simulated period, so
/// the portfolio loss for trial k is the sum of each risk's trial k.
pub struct RiskAggregator {
    config: SimulationConfig,
    rng: ChaCha20Rng,
    risks: Vec<RiskReport>,
    total_losses: Vec<f64>,
    total_inherent_loss: f64,
}

impl RiskAggregator {
    pub fn from_config(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        Ok(RiskAggregator {
            rng: ChaCha20Rng::seed_from_u64(config.seed),
            total_losses: vec![0.0; config.trials],
            risks: Vec::new(),
            total_inherent_loss: 0.0,
            config,
        })
    }

    pub fn total_inherent_loss(&self) -> f64 {
        self.total_inherent_loss
    }

    pub fn risks(&self) -> &[RiskReport] {
        &self.risks
    }

    /// Portfolio losses so far, in trial order.
    pub fn total_losses(&self) -> &[f64] {
        &self.total_losses
    }

    /// Fit and simulate one risk, then fold it into the portfolio.
    pub fn add_risk(&mut self, pair: &RiskRecordPair) -> Result<&RiskReport> {
        let id = pair.id;
        let rate = stats::poisson_rate(&pair.events).map_err(|e| e.for_risk(id))?;
        let ln = stats::lognormal_params(&pair.losses).map_err(|e| e.for_risk(id))?;
        let params =
            DistributionParameters::new(rate, ln.mu, ln.sigma).map_err(|e| e.for_risk(id))?;

        let losses = if self.config.parallel {
            // Distinct seed per risk keeps risks independent of each other.
            let seed = self.config.seed.wrapping_add(pair.id.0);
            simulator::simulate_par(&params, self.config.trials, seed)?
        } else {
            simulator::simulate(&params, self.config.trials, &mut self.rng)?
        };

        let inherent_loss = params.inherent_loss();
        debug!(
            risk = pair.id.0,
            rate,
            mu = ln.mu,
            sigma = ln.sigma,
            inherent_loss,
            "simulated risk"
        );

        for (total, loss) in self.total_losses.iter_mut().zip(&losses) {
            *total += loss;
        }
        self.total_inherent_loss += inherent_loss;

        self.risks.push(RiskReport {
            id: pair.id,
            event_stats: stats::describe_stats(&pair.events)?,
            loss_stats: stats::describe_stats(&pair.losses)?,
            params,
            inherent_loss,
            losses,
        });
        Ok(&self.risks[self.risks.len() - 1])
    }

    /// Sort the portfolio sample and build its exceedance curve.
    pub fn finish(self) -> Result<PortfolioReport> {
        if self.risks.is_empty() {
            return Err(RiskError::Input("no risks were added".to_string()));
        }
        let mut total_losses = self.total_losses;
        total_losses.sort_by(f64::total_cmp);

        let summary = LossSummary::from_sorted(&total_losses);
        let curve = ExceedanceCurve::build(&total_losses, self.config.threshold_step)?;
        info!(
            risks = self.risks.len(),
            trials = total_losses.len(),
            total_inherent_loss = self.total_inherent_loss,
            max = summary.max,
            "portfolio aggregated"
        );

        Ok(PortfolioReport {
            risks: self.risks,
            total_inherent_loss: self.total_inherent_loss,
            summary,
            total_losses,
            curve,
        })
    }
}

/// Run every risk through a fresh aggregator, stopping at the first bad risk.
pub fn aggregate(pairs: &[RiskRecordPair], config: SimulationConfig) -> Result<PortfolioReport> {
    let mut agg = RiskAggregator::from_config(config)?;
    for pair in pairs {
        agg.add_risk(pair)?;
    }
    agg.finish()
}
