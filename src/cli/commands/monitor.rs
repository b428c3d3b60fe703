//! Implementation of the `ledgerd monitor` command: one budget pass.

use anyhow::Result;
use clap::Args;
use comfy_table::{presets, Cell, ContentArrangement, Table};
use std::path::PathBuf;

use crate::cli::commands::{build_stack, load_config};
use crate::cli::commands::sweep::parse_at;
use crate::cli::output::{output, CommandOutput};
use crate::services::BudgetCheck;

#[derive(Args, Debug)]
pub struct MonitorArgs {
    /// Evaluate budgets as of this instant (RFC3339, defaults to now)
    #[arg(long)]
    pub at: Option<String>,
}

#[derive(Debug, serde::Serialize)]
pub struct BudgetCheckOutput {
    pub budget_id: String,
    pub spent: String,
    pub percentage_used: String,
    pub alerted: bool,
}

impl From<&BudgetCheck> for BudgetCheckOutput {
    fn from(c: &BudgetCheck) -> Self {
        Self {
            budget_id: c.budget_id.to_string(),
            spent: c.spent.to_string(),
            percentage_used: format!("{:.1}", c.percentage_used),
            alerted: c.alerted,
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub struct MonitorOutput {
    pub checks: Vec<BudgetCheckOutput>,
    pub alerted: usize,
}

impl CommandOutput for MonitorOutput {
    fn to_human(&self) -> String {
        if self.checks.is_empty() {
            return "No budgets to check.".to_string();
        }

        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL_CONDENSED)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["Budget", "Spent", "Used %", "Alerted"]);

        for check in &self.checks {
            table.add_row(vec![
                Cell::new(&check.budget_id[..8]),
                Cell::new(&check.spent),
                Cell::new(&check.percentage_used),
                Cell::new(if check.alerted { "yes" } else { "no" }),
            ]);
        }

        format!(
            "{table}\n{} of {} budget(s) alerted.",
            self.alerted,
            self.checks.len()
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(
    args: MonitorArgs,
    config_path: Option<PathBuf>,
    json_mode: bool,
) -> Result<()> {
    let config = load_config(config_path.as_ref())?;
    let stack = build_stack(&config).await?;

    let now = parse_at(args.at.as_deref())?;
    let checks = stack.monitor.run(now).await?;

    let out = MonitorOutput {
        alerted: checks.iter().filter(|c| c.alerted).count(),
        checks: checks.iter().map(BudgetCheckOutput::from).collect(),
    };
    output(&out, json_mode);
    Ok(())
}
