//! Retry policy with exponential backoff for transient store failures.
//!
//! The dispatch substrate owns retry: services return typed errors and
//! this policy decides, from the error kind, whether another attempt is
//! worthwhile. Backoff doubles per attempt and is capped.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::domain::errors::{EngineError, EngineResult};
use crate::domain::models::RetryConfig;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum attempts, first try included.
    max_attempts: u32,
    initial_backoff: Duration,
    max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_backoff: Duration, max_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff,
            max_backoff,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.initial_backoff_ms),
            Duration::from_millis(config.max_backoff_ms),
        )
    }

    fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    /// Run `operation` until it succeeds, fails terminally, or exhausts
    /// the attempt budget. Only `is_retryable` errors are retried.
    pub async fn execute<F, Fut, T>(&self, mut operation: F) -> EngineResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = EngineResult<T>>,
    {
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => {
                    if attempt > 0 {
                        debug!(retries = attempt, "operation succeeded after retries");
                    }
                    return Ok(result);
                }
                Err(err) if err.is_retryable() && attempt + 1 < self.max_attempts => {
                    let backoff = self.backoff_for(attempt);
                    warn!(
                        attempt = attempt + 1,
                        error = %err,
                        backoff_ms = backoff.as_millis() as u64,
                        "transient failure, retrying"
                    );
                    sleep(backoff).await;
                    attempt += 1;
                }
                Err(err) => {
                    if err.is_retryable() {
                        warn!(attempts = attempt + 1, error = %err, "retries exhausted");
                    } else {
                        debug!(error = %err, "terminal error, not retrying");
                    }
                    return Err(err);
                }
            }
        }
    }
}
