//! Engine configuration model.

use serde::{Deserialize, Serialize};

/// Main configuration structure for ledgerd.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Job dispatch configuration (cron schedules, throttling, retry)
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Budget alerting configuration
    #[serde(default)]
    pub alerts: AlertConfig,

    /// Notification sink configuration
    #[serde(default)]
    pub notifier: NotifierConfig,

    /// Insight generator configuration
    #[serde(default)]
    pub insights: InsightConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// Path to the SQLite database file
    #[serde(default = "default_database_path")]
    pub path: String,

    /// Maximum number of database connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> String {
    ".ledgerd/ledgerd.db".to_string()
}

const fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Cron schedules for the periodic jobs plus delivery policy.
///
/// Expressions are 6-field (`sec min hour dom month dow`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DispatchConfig {
    /// Daily recurrence sweep (midnight UTC).
    #[serde(default = "default_recurrence_cron")]
    pub recurrence_cron: String,

    /// Budget check, every six hours.
    #[serde(default = "default_budget_cron")]
    pub budget_cron: String,

    /// Monthly report, first of the month.
    #[serde(default = "default_report_cron")]
    pub report_cron: String,

    /// Dispatcher tick interval in milliseconds.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Occurrence events processed per owner per minute.
    #[serde(default = "default_events_per_minute_per_owner")]
    pub events_per_minute_per_owner: u32,

    /// Retry policy for transient store failures.
    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_recurrence_cron() -> String {
    "0 0 0 * * *".to_string()
}

fn default_budget_cron() -> String {
    "0 0 */6 * * *".to_string()
}

fn default_report_cron() -> String {
    "0 0 0 1 * *".to_string()
}

const fn default_tick_interval_ms() -> u64 {
    1000
}

const fn default_events_per_minute_per_owner() -> u32 {
    10
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            recurrence_cron: default_recurrence_cron(),
            budget_cron: default_budget_cron(),
            report_cron: default_report_cron(),
            tick_interval_ms: default_tick_interval_ms(),
            events_per_minute_per_owner: default_events_per_minute_per_owner(),
            retry: RetryConfig::default(),
        }
    }
}

/// Retry policy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RetryConfig {
    /// Maximum attempts per event (first try included)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Initial backoff duration in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Maximum backoff duration in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

const fn default_max_attempts() -> u32 {
    3
}

const fn default_initial_backoff_ms() -> u64 {
    1000
}

const fn default_max_backoff_ms() -> u64 {
    60_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

/// Budget alerting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AlertConfig {
    /// Percentage of the budget at which an alert fires
    #[serde(default = "default_threshold_percent")]
    pub threshold_percent: u32,
}

const fn default_threshold_percent() -> u32 {
    80
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            threshold_percent: default_threshold_percent(),
        }
    }
}

/// Notification sink configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NotifierConfig {
    /// Sink mode: "log" or "webhook"
    #[serde(default = "default_notifier_mode")]
    pub mode: String,

    /// Webhook endpoint, required when mode is "webhook"
    #[serde(default)]
    pub webhook_url: Option<String>,
}

fn default_notifier_mode() -> String {
    "log".to_string()
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            mode: default_notifier_mode(),
            webhook_url: None,
        }
    }
}

/// Insight generator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct InsightConfig {
    /// Generator mode: "static" or "http"
    #[serde(default = "default_insight_mode")]
    pub mode: String,

    /// Generation endpoint, required when mode is "http"
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Request timeout in milliseconds
    #[serde(default = "default_insight_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_insight_mode() -> String {
    "static".to_string()
}

const fn default_insight_timeout_ms() -> u64 {
    10_000
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            mode: default_insight_mode(),
            endpoint: None,
            timeout_ms: default_insight_timeout_ms(),
        }
    }
}
