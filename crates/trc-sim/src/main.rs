//! Trace timestamp simulator entry point.
//!
//! Runs a recorder session against a simulated hardware counter, with a
//! concurrent simulated interrupt source, and prints timestamp statistics.

mod report;
mod simulation;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::{info, warn};
use trc_common::config::TraceConfig;
use trc_timestamp::{EventWidth, TimestampClock};

/// Report output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Simulator command-line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "trc-sim",
    about = "Trace timestamp simulator - exercise a port's timestamp configuration on the host",
    version,
    long_about = None
)]
struct Args {
    /// Path to a trace configuration file (TOML).
    #[arg(long, short = 'c', value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of task events to simulate (overrides config file).
    #[arg(long, short = 'n')]
    events: Option<u64>,

    /// Override the timestamp frequency before the session starts.
    #[arg(long, value_name = "HZ")]
    frequency_hz: Option<u32>,

    /// Inline delta width of recorded events in bits (8 or 16).
    #[arg(long, default_value = "16")]
    event_bits: u8,

    /// Report format.
    #[arg(long, short = 'f', value_enum, default_value = "text")]
    format: OutputFormat,

    /// Print the effective configuration as TOML and exit.
    #[arg(long)]
    print_config: bool,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, short = 'l', default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level);

    info!(version = env!("CARGO_PKG_VERSION"), "Starting trace timestamp simulator");

    let mut config = load_config(&args)?;
    if let Some(events) = args.events {
        config.simulation.events = events;
    }

    if args.print_config {
        print!("{}", config.to_toml().context("Failed to serialize configuration")?);
        return Ok(());
    }

    let Some(width) = EventWidth::from_bits(args.event_bits) else {
        bail!("--event-bits must be 8 or 16, got {}", args.event_bits);
    };

    info!(port = %config.port, events = config.simulation.events, "Configuration loaded");

    let counter = simulation::counter_for(&config)?;
    let mut clock = TimestampClock::from_config(&config, counter)
        .with_context(|| format!("Invalid timestamp configuration for port {}", config.port))?;

    if let Some(frequency_hz) = args.frequency_hz {
        clock
            .set_frequency(frequency_hz)
            .context("Failed to override timestamp frequency")?;
    }

    let report = simulation::run(clock, &config, width)?;

    match args.format {
        OutputFormat::Text => print!("{report}"),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        ),
    }
    Ok(())
}

/// Initialize logging with the specified log level.
fn init_logging(level: &str) {
    let filter = format!("trc_sim={level},trc_timestamp={level},trc_common={level}");

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&filter)),
        )
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Load configuration from file or use defaults.
///
/// Resolution priority (first existing file wins):
/// 1. Command-line `--config` argument
/// 2. `TRC_CONFIG_PATH` environment variable
/// 3. `config/trace.toml` (local development)
/// 4. Built-in defaults
fn load_config(args: &Args) -> Result<TraceConfig> {
    if let Some(config_path) = &args.config {
        info!(?config_path, "Loading config from command-line argument");
        return TraceConfig::from_file(config_path)
            .with_context(|| format!("Failed to load config from {config_path:?}"));
    }

    if let Ok(env_path) = std::env::var("TRC_CONFIG_PATH") {
        let config_path = PathBuf::from(&env_path);
        if config_path.exists() {
            info!(?config_path, "Loading config from TRC_CONFIG_PATH");
            return TraceConfig::from_file(&config_path).with_context(|| {
                format!("Failed to load config from TRC_CONFIG_PATH={env_path:?}")
            });
        }
        warn!(
            path = %env_path,
            "TRC_CONFIG_PATH set but file does not exist, checking other locations"
        );
    }

    let local_path = PathBuf::from("config/trace.toml");
    if local_path.exists() {
        info!(?local_path, "Loading config from local path");
        return TraceConfig::from_file(&local_path)
            .with_context(|| format!("Failed to load config from {local_path:?}"));
    }

    info!("No config file found, using built-in defaults");
    Ok(TraceConfig::default())
}
