use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RiskError};
use crate::exceedance::DEFAULT_THRESHOLD_STEP;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub seed: u64,
    /// Simulated periods per risk.
    pub trials: usize,
    /// Spacing of exceedance-curve thresholds.
    pub threshold_step: u64,
    /// Losses whose exceedance probability is reported for the portfolio.
    pub report_thresholds: Vec<f64>,
    pub histogram_bins: usize,
    /// Draw trials on the rayon pool; results depend only on `seed`.
    pub parallel: bool,
}

impl SimulationConfig {
    pub fn canonical() -> Self {
        SimulationConfig {
            seed: 42,
            trials: 10_000,
            threshold_step: DEFAULT_THRESHOLD_STEP,
            // £30, £300, £3000
            report_thresholds: vec![30.0, 300.0, 3_000.0],
            histogram_bins: 500,
            parallel: false,
        }
    }

    /// Load a JSON config; missing fields take their canonical values.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let config: SimulationConfig = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.trials == 0 {
            return Err(RiskError::Input("config: trials must be > 0".to_string()));
        }
        if self.threshold_step == 0 {
            return Err(RiskError::Input("config: threshold_step must be > 0".to_string()));
        }
        if self.histogram_bins == 0 {
            return Err(RiskError::Input("config: histogram_bins must be > 0".to_string()));
        }
        Ok(())
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::canonical()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_is_valid() {
        let c = SimulationConfig::canonical();
        assert_eq!(c.trials, 10_000);
        assert_eq!(c.threshold_step, 2);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let c: SimulationConfig = serde_json::from_str(r#"{ "seed": 7, "trials": 500 }"#).unwrap();
        assert_eq!(c.seed, 7);
        assert_eq!(c.trials, 500);
        assert_eq!(c.report_thresholds, vec![30.0, 300.0, 3_000.0]);
        assert_eq!(c.histogram_bins, 500);
    }

    #[test]
    fn zero_trials_rejected() {
        let c = SimulationConfig { trials: 0, ..SimulationConfig::canonical() };
        assert!(matches!(c.validate(), Err(RiskError::Input(_))));
        let c = SimulationConfig { threshold_step: 0, ..SimulationConfig::canonical() };
        assert!(matches!(c.validate(), Err(RiskError::Input(_))));
    }

    #[test]
    fn missing_config_file_is_io_error() {
        let err = SimulationConfig::from_json_file("/nonexistent/riskmc.json").unwrap_err();
        assert!(matches!(err, RiskError::Io(_)));
    }
}
