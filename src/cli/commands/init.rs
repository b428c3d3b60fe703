//! Implementation of the `ledgerd init` command.

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use clap::Args;
use rust_decimal::Decimal;
use std::path::PathBuf;
use tokio::fs;

use crate::adapters::sqlite::{initialize_database, SqliteLedgerStore};
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{
    Account, Budget, RecurringInterval, Transaction, TransactionKind, User,
};

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Force reinitialization even if already initialized
    #[arg(long, short)]
    pub force: bool,

    /// Seed the database with a demo user, account, budget and templates
    #[arg(long)]
    pub demo: bool,

    /// Target directory (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

#[derive(Debug, serde::Serialize)]
pub struct InitOutput {
    pub success: bool,
    pub message: String,
    pub initialized_path: PathBuf,
    pub database_initialized: bool,
    pub demo_seeded: bool,
}

impl CommandOutput for InitOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![self.message.clone()];
        if self.database_initialized {
            lines.push("Database initialized at .ledgerd/ledgerd.db".to_string());
        }
        if self.demo_seeded {
            lines.push("Seeded demo user, account, budget and recurring templates".to_string());
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

const DEFAULT_CONFIG_YAML: &str = "\
# ledgerd configuration. Any value here can be overridden in
# .ledgerd/local.yaml or via LEDGERD_* environment variables.
database:
  path: .ledgerd/ledgerd.db
  max_connections: 5

logging:
  level: info
  format: pretty

dispatch:
  recurrence_cron: '0 0 0 * * *'
  budget_cron: '0 0 */6 * * *'
  report_cron: '0 0 0 1 * *'
  events_per_minute_per_owner: 10
  retry:
    max_attempts: 3
    initial_backoff_ms: 1000
    max_backoff_ms: 60000

alerts:
  threshold_percent: 80

notifier:
  mode: log

insights:
  mode: static
";

pub async fn execute(args: InitArgs, json_mode: bool) -> Result<()> {
    let target_path = if args.path.is_absolute() {
        args.path.clone()
    } else {
        std::env::current_dir()
            .context("Failed to get current directory")?
            .join(&args.path)
    };

    let ledgerd_dir = target_path.join(".ledgerd");

    if ledgerd_dir.exists() && !args.force {
        let out = InitOutput {
            success: false,
            message: "Project already initialized. Use --force to reinitialize.".to_string(),
            initialized_path: target_path,
            database_initialized: false,
            demo_seeded: false,
        };
        output(&out, json_mode);
        return Ok(());
    }

    if args.force && ledgerd_dir.exists() {
        fs::remove_dir_all(&ledgerd_dir)
            .await
            .context("Failed to remove existing .ledgerd directory")?;
    }

    fs::create_dir_all(&ledgerd_dir)
        .await
        .context("Failed to create .ledgerd directory")?;

    let config_path = ledgerd_dir.join("config.yaml");
    fs::write(&config_path, DEFAULT_CONFIG_YAML)
        .await
        .context("Failed to write default config")?;

    let db_path = ledgerd_dir.join("ledgerd.db");
    let db_url = format!("sqlite:{}", db_path.display());
    let pool = initialize_database(&db_url)
        .await
        .context("Failed to initialize database")?;

    let demo_seeded = if args.demo {
        seed_demo(&SqliteLedgerStore::new(pool)).await?;
        true
    } else {
        false
    };

    let out = InitOutput {
        success: true,
        message: if args.force {
            "Project reinitialized successfully.".to_string()
        } else {
            "Project initialized successfully.".to_string()
        },
        initialized_path: target_path,
        database_initialized: true,
        demo_seeded,
    };
    output(&out, json_mode);
    Ok(())
}

/// One user with a default account, a budget, some history and two
/// recurring templates that are immediately due.
async fn seed_demo(store: &SqliteLedgerStore) -> Result<()> {
    let now = Utc::now();

    let user = User::new("demo@example.com", "Demo User");
    store.create_user(&user).await?;

    let account = Account::new(user.id, "Checking", Decimal::new(250_000, 2)).as_default();
    store.create_account(&account).await?;

    let budget = Budget::new(user.id, Decimal::new(150_000, 2));
    store.create_budget(&budget).await?;

    let groceries = Transaction::new(
        user.id,
        account.id,
        TransactionKind::Expense,
        Decimal::new(8_450, 2),
        now - Duration::days(3),
    )
    .with_description("Groceries")
    .with_category("groceries");
    store.create_transaction(&groceries).await?;

    let rent = Transaction::new(
        user.id,
        account.id,
        TransactionKind::Expense,
        Decimal::new(95_000, 2),
        now - Duration::days(1),
    )
    .with_description("Rent")
    .with_category("housing")
    .recurring(RecurringInterval::Monthly);
    store.create_transaction(&rent).await?;

    let salary = Transaction::new(
        user.id,
        account.id,
        TransactionKind::Income,
        Decimal::new(320_000, 2),
        now - Duration::days(1),
    )
    .with_description("Salary")
    .with_category("salary")
    .recurring(RecurringInterval::Monthly);
    store.create_transaction(&salary).await?;

    Ok(())
}
