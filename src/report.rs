use std::io::{Read, Write};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::aggregator::PortfolioReport;
use crate::config::SimulationConfig;
use crate::error::{Result, RiskError};
use crate::histogram::Histogram;
use crate::types::RiskId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskHistogram {
    pub id: RiskId,
    /// `None` when the risk's losses have zero range (e.g. λ = 0).
    pub histogram: Option<Histogram>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdProbability {
    pub threshold: f64,
    pub probability: f64,
}

/// Everything a plotter needs, as plain numbers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportDocument {
    pub config: SimulationConfig,
    pub portfolio: PortfolioReport,
    pub histograms: Vec<RiskHistogram>,
    pub threshold_probabilities: Vec<ThresholdProbability>,
}

impl ReportDocument {
    pub fn build(config: SimulationConfig, portfolio: PortfolioReport) -> Result<Self> {
        let mut histograms = Vec::with_capacity(portfolio.risks.len());
        for risk in &portfolio.risks {
            let histogram = match Histogram::build(&risk.losses, config.histogram_bins) {
                Ok(h) => Some(h),
                Err(RiskError::DegenerateData(msg)) => {
                    warn!(risk = risk.id.0, "no histogram: {msg}");
                    None
                }
                Err(e) => return Err(e),
            };
            histograms.push(RiskHistogram { id: risk.id, histogram });
        }

        let threshold_probabilities = portfolio
            .threshold_probabilities(&config.report_thresholds)
            .into_iter()
            .map(|(threshold, probability)| ThresholdProbability { threshold, probability })
            .collect();

        Ok(ReportDocument { config, portfolio, histograms, threshold_probabilities })
    }
}

pub fn write_json<W: Write>(doc: &ReportDocument, writer: W) -> Result<()> {
    serde_json::to_writer(writer, doc)?;
    Ok(())
}

pub fn read_json<R: Read>(reader: R) -> Result<ReportDocument> {
    Ok(serde_json::from_reader(reader)?)
}

/// Whole pounds with thousands separators: 10000 → "£10,000".
pub fn format_currency(amount: f64) -> String {
    let rounded = amount.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 { format!("-£{grouped}") } else { format!("£{grouped}") }
}
