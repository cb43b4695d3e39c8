//! circuitguard - interactive electrical measurement recorder
//!
//! Loads the circuit snapshot, then runs the menu until the operator exits.

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use circuitguard_core::constants::{DEFAULT_ALERT_LOG, DEFAULT_DATA_FILE};
use circuitguard_core::{LoadOutcome, Monitor, MonitorConfig};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod menu;
mod session;

/// circuitguard - record circuit measurements and check them against safe ranges
#[derive(Parser, Debug)]
#[command(name = "circuitguard")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Snapshot file holding the circuit records
    #[arg(long, default_value = DEFAULT_DATA_FILE)]
    data_file: PathBuf,

    /// Append-only harmonic alert log
    #[arg(long, default_value = DEFAULT_ALERT_LOG)]
    alert_log: PathBuf,

    /// Directory reports are written into
    #[arg(long, default_value = ".")]
    report_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, default_value = "warn")]
    log_level: String,
}

impl Cli {
    fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            data_file: self.data_file.clone(),
            alert_log: self.alert_log.clone(),
            report_dir: self.report_dir.clone(),
        }
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    // Also captures records from the core's `log` facade
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let config = cli.monitor_config();
    let (mut monitor, outcome) = Monitor::open(&config);

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let stdout = io::stdout();
    let mut output = stdout.lock();

    match &outcome {
        LoadOutcome::Loaded { circuits, .. } => {
            session::announce(
                &mut output,
                &format!(
                    "Loaded {} circuit(s). Last saved: {}",
                    circuits,
                    monitor.store().last_saved()
                ),
            )?;
        }
        LoadOutcome::Degraded(reason) => {
            session::announce(
                &mut output,
                &format!("Starting with no circuits ({reason})."),
            )?;
        }
    }
    session::announce(
        &mut output,
        &format!(
            "Harmonic alerts are appended to '{}'.",
            monitor.alert_sink().path().display()
        ),
    )?;

    session::run(&mut monitor, &config.report_dir, &mut input, &mut output)
}
