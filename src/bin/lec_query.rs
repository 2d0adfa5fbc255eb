//! Exceedance-probability lookup against a saved riskmc JSON report.
//!
//! Usage: `lec_query <report.json> [threshold ...]` (defaults to the
//! report's configured thresholds).

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{Level, error};
use tracing_subscriber::FmtSubscriber;

use riskmc::error::Result;
use riskmc::report::{format_currency, read_json};

#[derive(Parser)]
#[command(name = "lec_query")]
#[command(version, about = "Query a saved loss exceedance curve", long_about = None)]
struct Cli {
    /// Report written by `riskmc --output`
    report: PathBuf,

    /// Loss thresholds to look up
    thresholds: Vec<f64>,
}

fn main() -> ExitCode {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::WARN)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let file = File::open(&cli.report)?;
    let doc = read_json(BufReader::new(file))?;
    let curve = &doc.portfolio.curve;

    let thresholds = if cli.thresholds.is_empty() {
        doc.config.report_thresholds.clone()
    } else {
        cli.thresholds
    };

    println!(
        "{} risks, {} trials, max loss {}",
        doc.portfolio.risks.len(),
        doc.portfolio.total_losses.len(),
        format_currency(curve.max_loss())
    );
    for t in thresholds {
        println!("  P(loss > {:>12}) = {:.4}", format_currency(t), curve.probability_at(t));
    }
    Ok(())
}
