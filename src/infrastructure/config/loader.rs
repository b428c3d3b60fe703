use std::str::FromStr;

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Database path cannot be empty")]
    EmptyDatabasePath,

    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),

    #[error("Invalid max_attempts: {0}. Cannot be 0")]
    InvalidMaxAttempts(u32),

    #[error(
        "Invalid backoff configuration: initial_backoff_ms ({0}) must be less than max_backoff_ms ({1})"
    )]
    InvalidBackoff(u64, u64),

    #[error("Invalid events_per_minute_per_owner: {0}. Must be at least 1")]
    InvalidOwnerRate(u32),

    #[error("Invalid alert threshold: {0}. Must be between 1 and 100")]
    InvalidThreshold(u32),

    #[error("Invalid cron expression for {job}: '{expression}' ({reason})")]
    InvalidCron {
        job: &'static str,
        expression: String,
        reason: String,
    },

    #[error("Invalid notifier mode: {0}. Must be one of: log, webhook")]
    InvalidNotifierMode(String),

    #[error("Notifier mode 'webhook' requires webhook_url")]
    MissingWebhookUrl,

    #[error("Invalid insight mode: {0}. Must be one of: static, http")]
    InvalidInsightMode(String),

    #[error("Insight mode 'http' requires endpoint")]
    MissingInsightEndpoint,
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .ledgerd/config.yaml (project config, created by init)
    /// 3. .ledgerd/local.yaml (project local overrides, optional)
    /// 4. Environment variables (LEDGERD_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".ledgerd/config.yaml"))
            .merge(Yaml::file(".ledgerd/local.yaml"))
            .merge(Env::prefixed("LEDGERD_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed("LEDGERD_").split("__"))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.database.path.is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }
        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(
                config.database.max_connections,
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }
        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let retry = &config.dispatch.retry;
        if retry.max_attempts == 0 {
            return Err(ConfigError::InvalidMaxAttempts(retry.max_attempts));
        }
        if retry.initial_backoff_ms >= retry.max_backoff_ms {
            return Err(ConfigError::InvalidBackoff(
                retry.initial_backoff_ms,
                retry.max_backoff_ms,
            ));
        }

        if config.dispatch.events_per_minute_per_owner == 0 {
            return Err(ConfigError::InvalidOwnerRate(
                config.dispatch.events_per_minute_per_owner,
            ));
        }

        Self::validate_cron("recurrence_cron", &config.dispatch.recurrence_cron)?;
        Self::validate_cron("budget_cron", &config.dispatch.budget_cron)?;
        Self::validate_cron("report_cron", &config.dispatch.report_cron)?;

        if config.alerts.threshold_percent == 0 || config.alerts.threshold_percent > 100 {
            return Err(ConfigError::InvalidThreshold(
                config.alerts.threshold_percent,
            ));
        }

        match config.notifier.mode.as_str() {
            "log" => {}
            "webhook" => {
                if config
                    .notifier
                    .webhook_url
                    .as_deref()
                    .is_none_or(str::is_empty)
                {
                    return Err(ConfigError::MissingWebhookUrl);
                }
            }
            other => return Err(ConfigError::InvalidNotifierMode(other.to_string())),
        }

        match config.insights.mode.as_str() {
            "static" => {}
            "http" => {
                if config
                    .insights
                    .endpoint
                    .as_deref()
                    .is_none_or(str::is_empty)
                {
                    return Err(ConfigError::MissingInsightEndpoint);
                }
            }
            other => return Err(ConfigError::InvalidInsightMode(other.to_string())),
        }

        Ok(())
    }

    fn validate_cron(job: &'static str, expression: &str) -> Result<(), ConfigError> {
        cron::Schedule::from_str(expression)
            .map(|_| ())
            .map_err(|e| ConfigError::InvalidCron {
                job,
                expression: expression.to_string(),
                reason: e.to_string(),
            })
    }
}
