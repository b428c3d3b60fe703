//! Ledger store port.
//!
//! The persistent store is an external transactional collaborator. The
//! engine holds no state between invocations; every run reconstructs what
//! it needs through this interface.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::errors::EngineResult;
use crate::domain::models::{Account, Budget, Transaction, User};

/// Everything the store must write atomically to post one due occurrence.
#[derive(Debug, Clone)]
pub struct OccurrencePosting {
    pub template_id: Uuid,
    pub user_id: Uuid,
    /// The new non-recurring row to insert.
    pub occurrence: Transaction,
    /// Applied to the account balance as a store-level atomic increment.
    pub balance_delta: Decimal,
    /// Advanced schedule state for the template.
    pub last_processed: DateTime<Utc>,
    pub next_occurrence_date: DateTime<Utc>,
}

/// Result of an atomic occurrence commit.
#[derive(Debug, Clone)]
pub enum PostingOutcome {
    /// All three writes committed; carries the inserted occurrence.
    Posted(Transaction),
    /// The template was no longer due when re-validated inside the
    /// transaction: a committed no-op. This is what makes redelivery of an
    /// already-processed event harmless.
    NotDue,
}

impl PostingOutcome {
    pub fn is_posted(&self) -> bool {
        matches!(self, Self::Posted(_))
    }
}

#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Read-only scan of recurring templates due at `now`. Takes no locks;
    /// correctness is enforced at the write step.
    async fn due_templates(&self, now: DateTime<Utc>) -> EngineResult<Vec<Transaction>>;

    /// Fetch a recurring template by id, scoped to its owner. Fails with
    /// `TemplateNotFound` if no matching template exists for that owner.
    async fn fetch_template(&self, template_id: Uuid, user_id: Uuid)
        -> EngineResult<Transaction>;

    /// Post one occurrence atomically: re-validate due-ness with a
    /// conditional schedule-advance write, insert the occurrence row, and
    /// apply the balance delta as an atomic increment. Either all three
    /// writes commit or none do.
    async fn commit_occurrence(
        &self,
        posting: OccurrencePosting,
        now: DateTime<Utc>,
    ) -> EngineResult<PostingOutcome>;

    /// Fetch an account by id.
    async fn account(&self, id: Uuid) -> EngineResult<Account>;

    /// The user's default account, if one exists.
    async fn default_account(&self, user_id: Uuid) -> EngineResult<Option<Account>>;

    /// All budgets under monitoring.
    async fn budgets(&self) -> EngineResult<Vec<Budget>>;

    /// Sum of EXPENSE transactions on the account within `[start, end)`.
    /// Zero if none.
    async fn expense_total(
        &self,
        account_id: Uuid,
        window: (DateTime<Utc>, DateTime<Utc>),
    ) -> EngineResult<Decimal>;

    /// Record that a budget alert was sent at `at`.
    async fn record_alert(&self, budget_id: Uuid, at: DateTime<Utc>) -> EngineResult<()>;

    /// Fetch a user by id.
    async fn user(&self, id: Uuid) -> EngineResult<User>;

    /// All known users (monthly report fan-out).
    async fn users(&self) -> EngineResult<Vec<User>>;

    /// All of a user's transactions dated within `[start, end)`.
    async fn transactions_in_window(
        &self,
        user_id: Uuid,
        window: (DateTime<Utc>, DateTime<Utc>),
    ) -> EngineResult<Vec<Transaction>>;
}
