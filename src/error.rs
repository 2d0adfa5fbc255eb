use thiserror::Error;

use crate::types::RiskId;

#[derive(Debug, Error)]
pub enum RiskError {
    /// Malformed or non-numeric row, unpaired risk, empty sample, bad config.
    #[error("input error: {0}")]
    Input(String),
    /// Value outside the domain of an estimator or distribution.
    #[error("domain error: {0}")]
    Domain(String),
    /// Sample with zero range where bins or curves need a spread.
    #[error("degenerate data: {0}")]
    DegenerateData(String),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RiskError>;

impl RiskError {
    /// Prefix a data error with the risk it was raised for.
    pub fn for_risk(self, id: RiskId) -> Self {
        match self {
            RiskError::Input(msg) => RiskError::Input(format!("risk {id}: {msg}")),
            RiskError::Domain(msg) => RiskError::Domain(format!("risk {id}: {msg}")),
            RiskError::DegenerateData(msg) => {
                RiskError::DegenerateData(format!("risk {id}: {msg}"))
            }
            other => other,
        }
    }
}
