//! ofdmlink-sim - Monte-Carlo BER sweep for the OFDM transceiver

use anyhow::{Context, Result};
use clap::Parser;
use ofdmlink_frame::FrameConfig;
use ofdmlink_tools::{run_sweep, Scenario, SimConfig, Simulation};
use std::path::PathBuf;
use tracing::info;

/// Bit error rate versus SNR for each equalizer
#[derive(Parser)]
#[command(name = "ofdmlink-sim")]
#[command(about = "Simulate OFDM transmissions over a multipath channel")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug output
    #[arg(long)]
    debug: bool,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the effective configuration to this TOML file and exit
    #[arg(long, value_name = "PATH")]
    save_config: Option<PathBuf>,

    /// SNR points in dB
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    snr: Option<Vec<f64>>,

    /// Trials per SNR point
    #[arg(short, long)]
    runs: Option<usize>,

    /// Data symbols per trial
    #[arg(short, long)]
    symbols: Option<usize>,

    /// Base random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Scenarios to simulate (repeatable)
    #[arg(long = "scenario", value_enum)]
    scenarios: Vec<Scenario>,

    /// Number of subcarriers
    #[arg(long)]
    subcarriers: Option<usize>,

    /// Cyclic prefix length
    #[arg(long)]
    cp_length: Option<usize>,

    /// OFDM symbols per pilot period
    #[arg(long)]
    pilot_time_spacing: Option<usize>,

    /// Subcarrier stride of the comb pilots
    #[arg(long)]
    pilot_freq_spacing: Option<usize>,

    /// Write the BER report as JSON
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl Cli {
    fn sim_config(&self) -> Result<SimConfig> {
        let mut config = match &self.config {
            Some(path) => SimConfig::from_file(path)?,
            None => SimConfig::default(),
        };

        if let Some(snr) = &self.snr {
            config.snr_db = snr.clone();
        }
        if let Some(runs) = self.runs {
            config.runs = runs;
        }
        if let Some(symbols) = self.symbols {
            config.symbols = symbols;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if !self.scenarios.is_empty() {
            config.scenarios = self.scenarios.clone();
        }

        let frame = config.frame;
        config.frame = FrameConfig::new(
            self.subcarriers.unwrap_or(frame.subcarriers()),
            self.cp_length.unwrap_or(frame.cp_length()),
            self.pilot_time_spacing.unwrap_or(frame.pilot_time_spacing()),
            self.pilot_freq_spacing.unwrap_or(frame.pilot_freq_spacing()),
            frame.pilot_value(),
        )
        .context("Invalid frame parameters")?;

        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug {
        tracing::Level::DEBUG
    } else if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    let config = cli.sim_config()?;

    if let Some(path) = &cli.save_config {
        config.save_to_file(path)?;
        println!("Configuration written to {:?}", path);
        return Ok(());
    }

    info!(
        subcarriers = config.frame.subcarriers(),
        cp_length = config.frame.cp_length(),
        runs = config.runs,
        symbols = config.symbols,
        "starting BER sweep"
    );

    let simulation = Simulation::new(config.frame, config.constellation)?;
    let report = run_sweep(&simulation, &config.sweep_params())?;

    print!("{}", report.to_table());

    if let Some(path) = &cli.output {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report: {:?}", path))?;
        info!("report written to {:?}", path);
    }

    Ok(())
}
