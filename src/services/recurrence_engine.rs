//! Recurrence engine: converts due recurring templates into posted
//! occurrences, exactly once each.
//!
//! The engine is stateless; `now` is always an explicit parameter so
//! sweeps and event handlers are deterministic under test.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::calendar;
use crate::domain::errors::{EngineError, EngineResult};
use crate::domain::models::{OccurrenceEvent, Transaction};
use crate::domain::ports::ledger_store::{LedgerStore, OccurrencePosting, PostingOutcome};

pub struct RecurrenceEngine<S: LedgerStore> {
    store: Arc<S>,
}

impl<S: LedgerStore> RecurrenceEngine<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Scan for due templates and fan out one dispatch event per template.
    ///
    /// Read-only; safe to run more than once per day because each
    /// resulting event is idempotently processed.
    pub async fn sweep_due(&self, now: DateTime<Utc>) -> EngineResult<Vec<OccurrenceEvent>> {
        let due = self.store.due_templates(now).await?;
        tracing::info!(count = due.len(), "recurrence sweep found due templates");
        Ok(due
            .iter()
            .map(|t| OccurrenceEvent::new(t.id, t.user_id))
            .collect())
    }

    /// Process one due-occurrence event.
    ///
    /// Idempotent under at-least-once delivery: a redelivery after a
    /// successful commit resolves to `NotDue` inside the store's atomic
    /// transaction and commits nothing; a redelivery after an aborted
    /// attempt retries cleanly because no partial state was persisted.
    pub async fn process_occurrence(
        &self,
        event: &OccurrenceEvent,
        now: DateTime<Utc>,
    ) -> EngineResult<PostingOutcome> {
        let (template_id, user_id) = event.validate()?;
        let template = self.store.fetch_template(template_id, user_id).await?;

        // Cheap pre-check; the authoritative check is re-run inside the
        // commit transaction against freshly read state.
        if !template.is_due(now) {
            tracing::debug!(%template_id, "template not due, skipping");
            return Ok(PostingOutcome::NotDue);
        }

        let posting = Self::build_posting(&template, now)?;
        let outcome = self.store.commit_occurrence(posting, now).await?;

        match &outcome {
            PostingOutcome::Posted(occurrence) => {
                tracing::info!(
                    %template_id,
                    occurrence_id = %occurrence.id,
                    amount = %occurrence.amount,
                    kind = occurrence.kind.as_str(),
                    "posted recurring occurrence"
                );
            }
            PostingOutcome::NotDue => {
                tracing::debug!(%template_id, "duplicate delivery, already processed");
            }
        }
        Ok(outcome)
    }

    fn build_posting(
        template: &Transaction,
        now: DateTime<Utc>,
    ) -> EngineResult<OccurrencePosting> {
        let interval = template.recurring_interval.ok_or_else(|| {
            EngineError::Validation(format!("template {} has no interval", template.id))
        })?;
        let occurrence = template.spawn_occurrence(now);
        let next = calendar::next_occurrence(now.date_naive(), interval);

        Ok(OccurrencePosting {
            template_id: template.id,
            user_id: template.user_id,
            balance_delta: occurrence.signed_delta(),
            occurrence,
            last_processed: now,
            next_occurrence_date: calendar::at_midnight(next),
        })
    }

    /// Convenience for one-shot CLI runs: sweep and process inline.
    pub async fn sweep_and_process(&self, now: DateTime<Utc>) -> EngineResult<SweepSummary> {
        let events = self.sweep_due(now).await?;
        let mut summary = SweepSummary::default();
        for event in events {
            match self.process_occurrence(&event, now).await {
                Ok(PostingOutcome::Posted(_)) => summary.posted += 1,
                Ok(PostingOutcome::NotDue) => summary.skipped += 1,
                Err(err) => {
                    summary.failed += 1;
                    tracing::error!(
                        template_id = ?event.template_id,
                        error = %err,
                        "occurrence processing failed"
                    );
                }
            }
        }
        Ok(summary)
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }
}

/// Outcome counts of one sweep pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepSummary {
    pub posted: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl SweepSummary {
    pub fn total(&self) -> usize {
        self.posted + self.skipped + self.failed
    }
}
