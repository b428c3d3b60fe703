//! Implementation of the `ledgerd sweep` command: one recurrence sweep.

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;
use std::path::PathBuf;

use crate::cli::commands::{build_stack, load_config};
use crate::cli::output::{output, CommandOutput};

#[derive(Args, Debug)]
pub struct SweepArgs {
    /// Process templates as of this instant (RFC3339, defaults to now)
    #[arg(long)]
    pub at: Option<String>,
}

#[derive(Debug, serde::Serialize)]
pub struct SweepOutput {
    pub success: bool,
    pub posted: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl CommandOutput for SweepOutput {
    fn to_human(&self) -> String {
        format!(
            "Sweep complete: {} posted, {} skipped, {} failed.",
            self.posted, self.skipped, self.failed
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub fn parse_at(at: Option<&str>) -> Result<DateTime<Utc>> {
    match at {
        Some(s) => {
            let dt = DateTime::parse_from_rfc3339(s)
                .map_err(|e| anyhow::anyhow!("Invalid --at datetime '{s}': {e}"))?;
            Ok(dt.with_timezone(&Utc))
        }
        None => Ok(Utc::now()),
    }
}

pub async fn execute(args: SweepArgs, config_path: Option<PathBuf>, json_mode: bool) -> Result<()> {
    let config = load_config(config_path.as_ref())?;
    let stack = build_stack(&config).await?;

    let now = parse_at(args.at.as_deref())?;
    let summary = stack.dispatcher.run_sweep(now).await?;

    let out = SweepOutput {
        success: summary.failed == 0,
        posted: summary.posted,
        skipped: summary.skipped,
        failed: summary.failed,
    };
    output(&out, json_mode);
    Ok(())
}
