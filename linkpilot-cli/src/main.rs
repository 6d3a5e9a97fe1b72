//! LinkPilot CLI
//!
//! Drives a web converter through the desktop, one link at a time.
//!
//! Usage:
//!   linkpilot run --config pilot.json --input tidal_links.csv
//!   linkpilot run --config pilot.json --input links.csv --column url --json
//!   linkpilot probe --config pilot.json

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use linkpilot::desktop::Desktop;
use linkpilot::sink::DEFAULT_FAILURE_LOG;
use linkpilot::source::DEFAULT_LINK_COLUMN;
use linkpilot::{
    CsvLinkSource, DownloadOrchestrator, FileFailureSink, LinkSource, PilotConfig, RunReport,
    StaticLinkSource, SystemClock,
};
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "linkpilot")]
#[command(about = "Batch downloads through a web converter by driving the desktop")]
struct Cli {
    /// Debug logging (RUST_LOG still wins when set)
    #[clap(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download every link from a CSV file
    Run(RunArgs),
    /// Sample each calibrated signal point once and compare it to the config
    Probe(ProbeArgs),
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Calibration file (JSON)
    #[clap(long, short, env = "LINKPILOT_CONFIG")]
    config: PathBuf,

    /// CSV file holding the links
    #[clap(long, short, env = "LINKPILOT_INPUT")]
    input: PathBuf,

    /// Header of the CSV column holding the links
    #[clap(long, env = "LINKPILOT_COLUMN", default_value = DEFAULT_LINK_COLUMN)]
    column: String,

    /// Append-only log of links that could not be downloaded
    #[clap(long, env = "LINKPILOT_FAILURES", default_value = DEFAULT_FAILURE_LOG)]
    failures: PathBuf,

    /// Override the number of download attempts per link
    #[clap(long)]
    max_attempts: Option<u32>,

    /// Override the per-attempt signal timeout, in seconds
    #[clap(long)]
    signal_timeout: Option<f64>,

    /// Override the pixel polling interval, in seconds
    #[clap(long)]
    poll_interval: Option<f64>,

    /// Print the full run report as JSON
    #[clap(long)]
    json: bool,
}

#[derive(Parser, Debug)]
struct ProbeArgs {
    /// Calibration file (JSON)
    #[clap(long, short, env = "LINKPILOT_CONFIG")]
    config: PathBuf,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Run(args) => run(args),
        Commands::Probe(args) => probe(args),
    };

    if let Err(e) = result {
        error!("{e:#}");
        eprintln!("❌ {e:#}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
    let default = if verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

fn load_config(path: &Path) -> Result<PilotConfig> {
    PilotConfig::from_file(path)
        .with_context(|| format!("Failed to load calibration from {}", path.display()))
}

fn run(args: RunArgs) -> Result<()> {
    let mut config = load_config(&args.config)?;
    if let Some(max_attempts) = args.max_attempts {
        config.max_attempts = max_attempts;
    }
    if let Some(timeout) = args.signal_timeout {
        config.signal_timeout_secs = timeout;
    }
    if let Some(interval) = args.poll_interval {
        config.poll_interval_secs = interval;
    }
    config.validate().context("Invalid command-line override")?;

    // Read every link up front so a bad input file fails before any input is sent.
    let links = CsvLinkSource::new(&args.input)
        .with_column(&args.column)
        .list()
        .context("Failed to load links")?;
    info!(
        links = links.len(),
        input = %args.input.display(),
        "Loaded links"
    );

    let desktop = Desktop::new(&config, true).context("Failed to set up the desktop")?;
    info!(failsafe_armed = desktop.is_armed(), "Starting run");

    let sink = FileFailureSink::new(&args.failures);
    let clock = SystemClock::new();
    let orchestrator = DownloadOrchestrator::new(
        &config,
        desktop.actuator(),
        desktop.detector(),
        &sink,
        &clock,
    );
    let report = orchestrator
        .run(&StaticLinkSource::new(links))
        .context("Run aborted")?;
    // A trip after the last sample or click never reaches the orchestrator.
    desktop
        .failsafe()
        .check()
        .context("Run aborted after the last link")?;

    print_report(&report, sink.path(), args.json)
}

fn print_report(report: &RunReport, failures: &Path, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }
    println!(
        "✅ {} downloaded, {} failed ({} total)",
        report.succeeded.len(),
        report.failed.len(),
        report.total()
    );
    if !report.failed.is_empty() {
        println!("   Failed links were appended to {}", failures.display());
        for task in &report.failed {
            println!("   - {} ({} attempts)", task.identifier(), task.attempts_used());
        }
    }
    Ok(())
}

fn probe(args: ProbeArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    let desktop = Desktop::new(&config, false).context("Failed to set up the desktop")?;
    let readings = linkpilot::probe(desktop.detector(), &config).context("Probe failed")?;
    println!("{}", serde_json::to_string_pretty(&readings)?);
    Ok(())
}
