//! Command-line interface for the ledgerd engine.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use output::{output, truncate, CommandOutput};

#[derive(Parser, Debug)]
#[command(
    name = "ledgerd",
    about = "Recurring-transaction and budget-alert scheduling engine",
    version
)]
pub struct Cli {
    /// Path to a configuration file (defaults to .ledgerd/config.yaml)
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Emit machine-readable JSON instead of human output
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize the project directory and database
    Init(commands::init::InitArgs),
    /// Run the dispatcher loop (cron-triggered jobs) until interrupted
    Run(commands::run::RunArgs),
    /// Run one recurrence sweep now and exit
    Sweep(commands::sweep::SweepArgs),
    /// Run one budget monitor pass now and exit
    Monitor(commands::monitor::MonitorArgs),
    /// Generate monthly reports or show one user's statistics
    Report(commands::report::ReportArgs),
    /// Inspect the configured job schedules
    Schedule(commands::schedule::ScheduleArgs),
}

/// Print an error in the requested mode and exit non-zero.
pub fn handle_error(err: anyhow::Error, json_mode: bool) {
    if json_mode {
        let payload = serde_json::json!({
            "success": false,
            "error": format!("{err:#}"),
        });
        eprintln!(
            "{}",
            serde_json::to_string_pretty(&payload).unwrap_or_else(|_| "{}".to_string())
        );
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(1);
}
