//! CLI command implementations.

pub mod init;
pub mod monitor;
pub mod report;
pub mod run;
pub mod schedule;
pub mod sweep;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::adapters::insights::{HttpInsightGenerator, StaticInsightGenerator};
use crate::adapters::notify::{LogNotifier, WebhookNotifier};
use crate::adapters::sqlite::{initialize_database, SqliteLedgerStore};
use crate::domain::models::Config;
use crate::domain::ports::{InsightGenerator, Notifier};
use crate::infrastructure::config::ConfigLoader;
use crate::services::{BudgetMonitor, Dispatcher, RecurrenceEngine, ReportService};

/// Load configuration, honoring an explicit `--config` path.
pub fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(p) => ConfigLoader::load_from_file(p),
        None => ConfigLoader::load(),
    }
}

/// All the wired-up services a command might need.
pub struct EngineStack {
    pub store: Arc<SqliteLedgerStore>,
    pub engine: Arc<RecurrenceEngine<SqliteLedgerStore>>,
    pub monitor: Arc<BudgetMonitor<SqliteLedgerStore>>,
    pub reports: Arc<ReportService<SqliteLedgerStore>>,
    pub dispatcher: Arc<Dispatcher<SqliteLedgerStore>>,
}

/// Open the database and wire the services from configuration.
pub async fn build_stack(config: &Config) -> Result<EngineStack> {
    let db_url = format!("sqlite:{}", config.database.path);
    let pool = initialize_database(&db_url)
        .await
        .context("Failed to initialize database. Run 'ledgerd init' first.")?;

    let store = Arc::new(SqliteLedgerStore::new(pool));
    let notifier = build_notifier(config)?;
    let insights = build_insights(config)?;

    let engine = Arc::new(RecurrenceEngine::new(store.clone()));
    let monitor = Arc::new(BudgetMonitor::new(
        store.clone(),
        notifier.clone(),
        config.alerts.threshold_percent,
    ));
    let reports = Arc::new(ReportService::new(store.clone(), notifier, insights));
    let dispatcher = Arc::new(Dispatcher::new(
        engine.clone(),
        monitor.clone(),
        reports.clone(),
        &config.dispatch,
    )?);

    Ok(EngineStack {
        store,
        engine,
        monitor,
        reports,
        dispatcher,
    })
}

fn build_notifier(config: &Config) -> Result<Arc<dyn Notifier>> {
    match config.notifier.mode.as_str() {
        "webhook" => {
            let url = config
                .notifier
                .webhook_url
                .as_deref()
                .context("notifier mode 'webhook' requires webhook_url")?;
            Ok(Arc::new(WebhookNotifier::new(url)))
        }
        _ => Ok(Arc::new(LogNotifier)),
    }
}

fn build_insights(config: &Config) -> Result<Arc<dyn InsightGenerator>> {
    match config.insights.mode.as_str() {
        "http" => {
            let endpoint = config
                .insights
                .endpoint
                .as_deref()
                .context("insight mode 'http' requires endpoint")?;
            let generator = HttpInsightGenerator::new(
                endpoint,
                Duration::from_millis(config.insights.timeout_ms),
            )?;
            Ok(Arc::new(generator))
        }
        _ => Ok(Arc::new(StaticInsightGenerator)),
    }
}
