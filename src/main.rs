use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

use riskmc::aggregator::RiskAggregator;
use riskmc::config::SimulationConfig;
use riskmc::error::Result;
use riskmc::input;
use riskmc::report::{self, ReportDocument, format_currency};

#[derive(Parser)]
#[command(name = "riskmc")]
#[command(
    version,
    about = "Poisson/LogNormal Monte Carlo loss simulation and exceedance curve",
    long_about = None
)]
struct Cli {
    /// CSV of paired rows: event counts, then loss magnitudes, per risk
    #[arg(short, long, default_value = "data.csv")]
    input: PathBuf,

    /// JSON config file; fields left out keep their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long)]
    seed: Option<u64>,

    /// Simulated periods per risk
    #[arg(long)]
    trials: Option<usize>,

    /// Exceedance-curve threshold spacing
    #[arg(long)]
    step: Option<u64>,

    /// Draw trials on all cores
    #[arg(long)]
    parallel: bool,

    /// Write the full report (samples, histograms, curve) as JSON
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Suppress the console report
    #[arg(short, long)]
    quiet: bool,

    /// Log level: trace, debug, info, warn, error
    #[arg(long, default_value = "info", value_parser = clap::value_parser!(Level))]
    log_level: Level,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("warning: a tracing subscriber was already installed");
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => SimulationConfig::from_json_file(path)?,
        None => SimulationConfig::canonical(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if let Some(trials) = cli.trials {
        config.trials = trials;
    }
    if let Some(step) = cli.step {
        config.threshold_step = step;
    }
    config.parallel |= cli.parallel;

    let pairs = input::load_pairs(&cli.input)?;

    let mut agg = RiskAggregator::from_config(config.clone())?;
    for pair in &pairs {
        let risk = agg.add_risk(pair)?;
        if !cli.quiet {
            print_risk(risk);
        }
    }
    let portfolio = agg.finish()?;
    let doc = ReportDocument::build(config, portfolio)?;

    if !cli.quiet {
        print_portfolio(&doc);
    }

    if let Some(path) = &cli.output {
        let writer = BufWriter::new(File::create(path)?);
        report::write_json(&doc, writer)?;
        info!("report written to {}", path.display());
    }
    Ok(())
}

fn print_risk(risk: &riskmc::aggregator::RiskReport) {
    let (e, l) = (&risk.event_stats, &risk.loss_stats);
    println!("\n--- Risk {} ---", risk.id);
    println!(
        "  event stats:   mean={:.4}  median={:.4}  variance={:.4}",
        e.mean, e.median, e.variance
    );
    println!(
        "  loss stats:    mean={:.4}  median={:.4}  variance={:.4}",
        l.mean, l.median, l.variance
    );
    println!("  poisson rate:  {:.6}", risk.params.rate);
    println!("  ln mu:         {:.6}", risk.params.severity.mu);
    println!("  ln sigma:      {:.6}", risk.params.severity.sigma);
    println!("  inherent loss: {:.4}", risk.inherent_loss);
}

fn print_portfolio(doc: &ReportDocument) {
    let p = &doc.portfolio;
    println!("\n--- All Risks ---");
    println!("  Total inherent loss:     {:.4}", p.total_inherent_loss);
    println!("  Minimum simulated loss:  {:.4}", p.summary.min);
    println!("  Maximum simulated loss:  {:.4}", p.summary.max);
    println!("  Midrange simulated loss: {:.4}", p.summary.midrange);
    println!("  Mean simulated loss:     {:.4}", p.summary.mean);

    println!(
        "\n=== Loss exceedance ({} points, step {}) ===",
        p.curve.points().len(),
        p.curve.step()
    );
    for tp in &doc.threshold_probabilities {
        println!(
            "  P(loss > {:>10}) = {:.4}",
            format_currency(tp.threshold),
            tp.probability
        );
    }
    for h in &doc.histograms {
        if h.histogram.is_none() {
            println!("  Risk {}: no histogram (all simulated losses equal)", h.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_level_parses_known_names() {
        let cli = Cli::try_parse_from(["riskmc", "--log-level", "debug"]).unwrap();
        assert_eq!(cli.log_level, Level::DEBUG);
        let cli = Cli::try_parse_from(["riskmc"]).unwrap();
        assert_eq!(cli.log_level, Level::INFO);
    }

    #[test]
    fn unknown_log_level_is_rejected() {
        assert!(Cli::try_parse_from(["riskmc", "--log-level", "verbose"]).is_err());
    }
}
