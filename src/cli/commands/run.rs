//! Implementation of the `ledgerd run` command: the long-running
//! dispatcher loop.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use crate::cli::commands::{build_stack, load_config};
use crate::cli::output::{output, CommandOutput};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Run each job once at startup before entering the cron loop
    #[arg(long)]
    pub catch_up: bool,
}

#[derive(Debug, serde::Serialize)]
pub struct RunOutput {
    pub success: bool,
    pub message: String,
    pub failed_events: u64,
}

impl CommandOutput for RunOutput {
    fn to_human(&self) -> String {
        self.message.clone()
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: RunArgs, config_path: Option<PathBuf>, json_mode: bool) -> Result<()> {
    let config = load_config(config_path.as_ref())?;
    let stack = build_stack(&config).await?;

    if args.catch_up {
        let now = chrono::Utc::now();
        let summary = stack.dispatcher.run_sweep(now).await?;
        tracing::info!(
            posted = summary.posted,
            skipped = summary.skipped,
            failed = summary.failed,
            "catch-up sweep complete"
        );
        stack.monitor.run(now).await?;
    }

    let handle = stack.dispatcher.start();
    tracing::info!(
        recurrence = %config.dispatch.recurrence_cron,
        budgets = %config.dispatch.budget_cron,
        reports = %config.dispatch.report_cron,
        "dispatcher running, press Ctrl-C to stop"
    );

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;

    stack.dispatcher.stop();
    handle.await.context("Dispatcher task panicked")?;

    let out = RunOutput {
        success: true,
        message: "Dispatcher stopped.".to_string(),
        failed_events: stack.dispatcher.failed_event_count(),
    };
    output(&out, json_mode);
    Ok(())
}
