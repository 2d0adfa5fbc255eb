use serde::{Deserialize, Serialize};

/// 1-based position of a risk in the input (rows 2i-2 and 2i-1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RiskId(pub u64);

impl RiskId {
    /// Risk owning the row pair that starts at `row` (0-based, even).
    pub fn from_row(row: usize) -> Self {
        RiskId(row as u64 / 2 + 1)
    }
}

impl std::fmt::Display for RiskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raw observations for one risk: per-period event counts and per-event
/// loss magnitudes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskRecordPair {
    pub id: RiskId,
    pub events: Vec<f64>,
    pub losses: Vec<f64>,
}
