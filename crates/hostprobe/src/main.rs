//! hostprobe
//!
//! Queries CPU temperature, battery level, CPU usage and microphone noise once
//! and prints whatever could be measured.

mod config;
mod rendering;
mod report;

use anyhow::{Context, Result};
use clap::Parser;
use hostprobe_sensors::SpectrumSink;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use config::Config;
use rendering::SpectrumPlot;
use report::{build_sensors, Reporter};

#[derive(Parser)]
#[command(name = "hostprobe")]
#[command(about = "Print a one-shot report of host sensors")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the microphone noise spectrum to this PNG file
    #[arg(long)]
    plot: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging; stdout is reserved for the report
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let mut config = match &cli.config {
        Some(path) => {
            let config = Config::load(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            info!("Loaded configuration from: {}", path.display());
            config
        }
        None => Config::default(),
    };
    if cli.plot.is_some() {
        config.spectrum.output = cli.plot;
    }

    let spectrum_sink = config.spectrum.output.as_ref().map(|path| {
        Box::new(SpectrumPlot::new(
            path.clone(),
            config.spectrum.width,
            config.spectrum.height,
        )) as Box<dyn SpectrumSink>
    });

    let sensors = build_sensors(&config, spectrum_sink);
    debug!("Querying {} sensors", sensors.len());

    let stdout = std::io::stdout();
    let mut reporter = Reporter::new(stdout.lock());
    let reported = reporter.run(&sensors)?;
    debug!("Reported {} of {} sensors", reported, sensors.len());

    Ok(())
}
