//! Implementation of the `ledgerd report` command.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use comfy_table::{presets, Cell, ContentArrangement, Table};
use std::path::PathBuf;
use uuid::Uuid;

use crate::cli::commands::sweep::parse_at;
use crate::cli::commands::{build_stack, load_config};
use crate::cli::output::{output, CommandOutput};

#[derive(Args, Debug)]
pub struct ReportArgs {
    #[command(subcommand)]
    pub command: ReportCommands,
}

#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Send previous-month reports to every user, as the monthly job would
    Send {
        /// Treat this instant as "now" (RFC3339, defaults to now)
        #[arg(long)]
        at: Option<String>,
    },
    /// Show one user's statistics for the month containing a given instant
    Show {
        /// User ID
        user_id: Uuid,

        /// Month to aggregate, by any instant inside it (defaults to now)
        #[arg(long)]
        at: Option<String>,
    },
}

#[derive(Debug, serde::Serialize)]
pub struct ReportSendOutput {
    pub success: bool,
    pub sent: usize,
}

impl CommandOutput for ReportSendOutput {
    fn to_human(&self) -> String {
        format!("Sent {} monthly report(s).", self.sent)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, serde::Serialize)]
pub struct StatsOutput {
    pub user_id: String,
    pub total_income: String,
    pub total_expenses: String,
    pub net: String,
    pub transaction_count: usize,
    pub by_category: Vec<(String, String)>,
}

impl CommandOutput for StatsOutput {
    fn to_human(&self) -> String {
        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL_CONDENSED)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["Metric", "Value"]);
        table.add_row(vec![Cell::new("Total Income"), Cell::new(&self.total_income)]);
        table.add_row(vec![
            Cell::new("Total Expenses"),
            Cell::new(&self.total_expenses),
        ]);
        table.add_row(vec![Cell::new("Net"), Cell::new(&self.net)]);
        table.add_row(vec![
            Cell::new("Transactions"),
            Cell::new(self.transaction_count.to_string()),
        ]);

        let mut lines = vec![format!("Monthly statistics for user {}:", self.user_id)];
        lines.push(table.to_string());

        if !self.by_category.is_empty() {
            lines.push("Expenses by category:".to_string());
            for (category, amount) in &self.by_category {
                lines.push(format!("  {category}: {amount}"));
            }
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(
    args: ReportArgs,
    config_path: Option<PathBuf>,
    json_mode: bool,
) -> Result<()> {
    let config = load_config(config_path.as_ref())?;
    let stack = build_stack(&config).await?;

    match args.command {
        ReportCommands::Send { at } => {
            let now = parse_at(at.as_deref())?;
            let sent = stack
                .reports
                .run(now)
                .await
                .context("Monthly report run failed")?;
            output(&ReportSendOutput { success: true, sent }, json_mode);
        }
        ReportCommands::Show { user_id, at } => {
            let at = parse_at(at.as_deref())?;
            let stats = stack.reports.monthly_stats(user_id, at).await?;

            let out = StatsOutput {
                user_id: user_id.to_string(),
                total_income: stats.total_income.to_string(),
                total_expenses: stats.total_expenses.to_string(),
                net: stats.net().to_string(),
                transaction_count: stats.transaction_count,
                by_category: stats
                    .by_category
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_string()))
                    .collect(),
            };
            output(&out, json_mode);
        }
    }
    Ok(())
}
