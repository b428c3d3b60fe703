//! Job dispatcher: time-based triggers plus throttled, retried delivery
//! of occurrence events.
//!
//! Jobs fire from a tick loop against cron schedules. Each occurrence
//! event is rate-limited per owner, retried with exponential backoff on
//! transient store failures, and surfaced (never dropped) when retries
//! are exhausted.

use std::num::NonZeroU32;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use governor::clock::DefaultClock;
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{Quota, RateLimiter};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::errors::{EngineError, EngineResult};
use crate::domain::models::{DispatchConfig, OccurrenceEvent};
use crate::domain::ports::ledger_store::{LedgerStore, PostingOutcome};
use crate::services::budget_monitor::BudgetMonitor;
use crate::services::recurrence_engine::{RecurrenceEngine, SweepSummary};
use crate::services::report_service::ReportService;
use crate::services::retry::RetryPolicy;

type OwnerLimiter = RateLimiter<Uuid, DefaultKeyedStateStore<Uuid>, DefaultClock>;

/// The periodic jobs this engine runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    RecurrenceSweep,
    BudgetCheck,
    MonthlyReport,
}

impl JobKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RecurrenceSweep => "recurrence-sweep",
            Self::BudgetCheck => "budget-check",
            Self::MonthlyReport => "monthly-report",
        }
    }
}

/// One registered cron job.
#[derive(Debug)]
pub struct Job {
    pub kind: JobKind,
    pub expression: String,
    schedule: cron::Schedule,
    last_fired: Option<DateTime<Utc>>,
    registered_at: DateTime<Utc>,
}

impl Job {
    fn new(kind: JobKind, expression: &str) -> EngineResult<Self> {
        let schedule =
            cron::Schedule::from_str(expression).map_err(|e| EngineError::InvalidSchedule {
                expression: expression.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            kind,
            expression: expression.to_string(),
            schedule,
            last_fired: None,
            registered_at: Utc::now(),
        })
    }

    /// A job fires when its next cron occurrence after the last fire (or
    /// registration) has arrived. Missed firings do not accumulate.
    fn should_fire(&self, now: DateTime<Utc>) -> bool {
        let reference = self.last_fired.unwrap_or(self.registered_at);
        self.schedule
            .after(&reference)
            .next()
            .is_some_and(|next| now >= next)
    }

    pub fn next_fire(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.schedule.after(&now).next()
    }

    pub fn last_fired(&self) -> Option<DateTime<Utc>> {
        self.last_fired
    }
}

pub struct Dispatcher<S: LedgerStore + 'static> {
    engine: Arc<RecurrenceEngine<S>>,
    monitor: Arc<BudgetMonitor<S>>,
    reports: Arc<ReportService<S>>,
    jobs: Arc<RwLock<Vec<Job>>>,
    limiter: OwnerLimiter,
    retry: RetryPolicy,
    tick_interval: Duration,
    running: Arc<AtomicBool>,
    failed_events: AtomicU64,
}

impl<S: LedgerStore + 'static> Dispatcher<S> {
    pub fn new(
        engine: Arc<RecurrenceEngine<S>>,
        monitor: Arc<BudgetMonitor<S>>,
        reports: Arc<ReportService<S>>,
        config: &DispatchConfig,
    ) -> EngineResult<Self> {
        let jobs = vec![
            Job::new(JobKind::RecurrenceSweep, &config.recurrence_cron)?,
            Job::new(JobKind::BudgetCheck, &config.budget_cron)?,
            Job::new(JobKind::MonthlyReport, &config.report_cron)?,
        ];

        // Config validation rejects a zero rate before we get here.
        let per_minute =
            NonZeroU32::new(config.events_per_minute_per_owner).unwrap_or(NonZeroU32::MIN);

        Ok(Self {
            engine,
            monitor,
            reports,
            jobs: Arc::new(RwLock::new(jobs)),
            limiter: RateLimiter::keyed(Quota::per_minute(per_minute)),
            retry: RetryPolicy::from_config(&config.retry),
            tick_interval: Duration::from_millis(config.tick_interval_ms),
            running: Arc::new(AtomicBool::new(false)),
            failed_events: AtomicU64::new(0),
        })
    }

    /// Deliver one occurrence event: throttle by owner, process with
    /// retry on transient failures.
    pub async fn deliver(
        &self,
        event: OccurrenceEvent,
        now: DateTime<Utc>,
    ) -> EngineResult<PostingOutcome> {
        if let Some(owner) = event.user_id {
            // Bounds throughput per owner during backfill storms.
            self.limiter.until_key_ready(&owner).await;
        }

        let result = self
            .retry
            .execute(|| self.engine.process_occurrence(&event, now))
            .await;

        if let Err(err) = &result {
            self.failed_events.fetch_add(1, Ordering::Relaxed);
            tracing::error!(
                template_id = ?event.template_id,
                user_id = ?event.user_id,
                error = %err,
                "occurrence event failed"
            );
        }
        result
    }

    /// Run one recurrence sweep and deliver every resulting event.
    ///
    /// Each unit is independently atomic, so an interrupted sweep leaves
    /// committed occurrences intact and the next sweep picks up the rest.
    pub async fn run_sweep(&self, now: DateTime<Utc>) -> EngineResult<SweepSummary> {
        let events = self.engine.sweep_due(now).await?;
        let mut summary = SweepSummary::default();

        for event in events {
            match self.deliver(event, now).await {
                Ok(PostingOutcome::Posted(_)) => summary.posted += 1,
                Ok(PostingOutcome::NotDue) => summary.skipped += 1,
                Err(_) => summary.failed += 1,
            }
        }

        tracing::info!(
            posted = summary.posted,
            skipped = summary.skipped,
            failed = summary.failed,
            "recurrence sweep complete"
        );
        Ok(summary)
    }

    async fn run_job(&self, kind: JobKind, now: DateTime<Utc>) {
        let result: EngineResult<()> = match kind {
            JobKind::RecurrenceSweep => self.run_sweep(now).await.map(|_| ()),
            JobKind::BudgetCheck => self.monitor.run(now).await.map(|_| ()),
            JobKind::MonthlyReport => self.reports.run(now).await.map(|_| ()),
        };
        if let Err(err) = result {
            tracing::error!(job = kind.as_str(), error = %err, "scheduled job failed");
        }
    }

    /// Number of events that exhausted their retries. Operator-visible
    /// failure signal; failed events are never silently dropped.
    pub fn failed_event_count(&self) -> u64 {
        self.failed_events.load(Ordering::Relaxed)
    }

    /// Snapshot of the registered jobs for display.
    pub async fn job_table(&self) -> Vec<(JobKind, String, Option<DateTime<Utc>>)> {
        let now = Utc::now();
        self.jobs
            .read()
            .await
            .iter()
            .map(|j| (j.kind, j.expression.clone(), j.next_fire(now)))
            .collect()
    }

    /// Start the tick loop. Returns a JoinHandle.
    pub fn start(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        self.running.store(true, Ordering::SeqCst);
        let dispatcher = Arc::clone(self);

        tokio::spawn(async move {
            while dispatcher.running.load(Ordering::SeqCst) {
                tokio::time::sleep(dispatcher.tick_interval).await;
                let now = Utc::now();

                let mut to_fire = Vec::new();
                {
                    let mut jobs = dispatcher.jobs.write().await;
                    for job in jobs.iter_mut() {
                        if job.should_fire(now) {
                            job.last_fired = Some(now);
                            to_fire.push(job.kind);
                        }
                    }
                }

                for kind in to_fire {
                    tracing::debug!(job = kind.as_str(), "cron trigger fired");
                    dispatcher.run_job(kind, now).await;
                }
            }
        })
    }

    /// Stop the tick loop after the current tick.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_cron_expression() {
        let err = Job::new(JobKind::BudgetCheck, "not a cron").unwrap_err();
        assert!(matches!(err, EngineError::InvalidSchedule { .. }));
    }

    #[test]
    fn job_fires_when_next_occurrence_passes() {
        // Every second.
        let mut job = Job::new(JobKind::RecurrenceSweep, "* * * * * *").unwrap();
        job.registered_at = Utc::now() - chrono::Duration::seconds(5);
        assert!(job.should_fire(Utc::now()));

        job.last_fired = Some(Utc::now() + chrono::Duration::seconds(5));
        assert!(!job.should_fire(Utc::now()));
    }

    #[test]
    fn default_schedules_parse() {
        let config = DispatchConfig::default();
        assert!(Job::new(JobKind::RecurrenceSweep, &config.recurrence_cron).is_ok());
        assert!(Job::new(JobKind::BudgetCheck, &config.budget_cron).is_ok());
        assert!(Job::new(JobKind::MonthlyReport, &config.report_cron).is_ok());
    }
}
