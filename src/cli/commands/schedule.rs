//! Implementation of the `ledgerd schedule` command.

use anyhow::Result;
use clap::{Args, Subcommand};
use comfy_table::{presets, Cell, ContentArrangement, Table};
use std::path::PathBuf;

use crate::cli::commands::{build_stack, load_config};
use crate::cli::output::{output, CommandOutput};

#[derive(Args, Debug)]
pub struct ScheduleArgs {
    #[command(subcommand)]
    pub command: ScheduleCommands,
}

#[derive(Subcommand, Debug)]
pub enum ScheduleCommands {
    /// List the configured jobs and their next fire times
    List,
}

#[derive(Debug, serde::Serialize)]
pub struct JobOutput {
    pub job: String,
    pub cron: String,
    pub next_fire: Option<String>,
}

#[derive(Debug, serde::Serialize)]
pub struct ScheduleListOutput {
    pub jobs: Vec<JobOutput>,
}

impl CommandOutput for ScheduleListOutput {
    fn to_human(&self) -> String {
        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL_CONDENSED)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["Job", "Cron", "Next Fire (UTC)"]);

        for job in &self.jobs {
            table.add_row(vec![
                Cell::new(&job.job),
                Cell::new(&job.cron),
                Cell::new(job.next_fire.as_deref().unwrap_or("-")),
            ]);
        }
        table.to_string()
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(
    args: ScheduleArgs,
    config_path: Option<PathBuf>,
    json_mode: bool,
) -> Result<()> {
    let config = load_config(config_path.as_ref())?;
    let stack = build_stack(&config).await?;

    match args.command {
        ScheduleCommands::List => {
            let jobs = stack
                .dispatcher
                .job_table()
                .await
                .into_iter()
                .map(|(kind, cron, next)| JobOutput {
                    job: kind.as_str().to_string(),
                    cron,
                    next_fire: next.map(|t| t.to_rfc3339()),
                })
                .collect();
            output(&ScheduleListOutput { jobs }, json_mode);
        }
    }
    Ok(())
}
