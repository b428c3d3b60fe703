//! Transaction domain model.
//!
//! A transaction row is either a posted ledger entry or a recurring
//! "template". A template is never re-dated in place to produce ledger
//! entries: each due occurrence inserts a new non-recurring row, while the
//! template's `last_processed` / `next_occurrence_date` fields track
//! scheduling state only.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::{EngineError, EngineResult};
use crate::domain::models::money;

/// Direction of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "income" => Some(Self::Income),
            "expense" => Some(Self::Expense),
            _ => None,
        }
    }
}

/// Recurrence interval for a template transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurringInterval {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl RecurringInterval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            "yearly" => Some(Self::Yearly),
            _ => None,
        }
    }
}

/// Lifecycle status of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub account_id: Uuid,
    pub kind: TransactionKind,
    /// Non-negative; direction comes from `kind`.
    pub amount: Decimal,
    pub description: String,
    pub category: String,
    pub date: DateTime<Utc>,
    pub is_recurring: bool,
    /// Required iff `is_recurring`.
    pub recurring_interval: Option<RecurringInterval>,
    /// Scheduling state; meaningful only on templates.
    pub last_processed: Option<DateTime<Utc>>,
    pub next_occurrence_date: Option<DateTime<Utc>>,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Create a plain (non-recurring) transaction.
    pub fn new(
        user_id: Uuid,
        account_id: Uuid,
        kind: TransactionKind,
        amount: Decimal,
        date: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            account_id,
            kind,
            amount,
            description: String::new(),
            category: "uncategorized".to_string(),
            date,
            is_recurring: false,
            recurring_interval: None,
            last_processed: None,
            next_occurrence_date: None,
            status: TransactionStatus::Completed,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Turn this transaction into a recurring template.
    pub fn recurring(mut self, interval: RecurringInterval) -> Self {
        self.is_recurring = true;
        self.recurring_interval = Some(interval);
        self
    }

    /// Whether this template is due for processing at `now`: never run, or
    /// its scheduled next date has arrived.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        if !self.is_recurring || self.status != TransactionStatus::Completed {
            return false;
        }
        match self.last_processed {
            None => true,
            Some(_) => self.next_occurrence_date.is_some_and(|next| next <= now),
        }
    }

    /// Balance delta this transaction applies to its account.
    pub fn signed_delta(&self) -> Decimal {
        match self.kind {
            TransactionKind::Income => self.amount,
            TransactionKind::Expense => -self.amount,
        }
    }

    /// Build the occurrence row a due template posts: same kind, amount,
    /// category and account, dated `now`, marked as generated.
    pub fn spawn_occurrence(&self, now: DateTime<Utc>) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            user_id: self.user_id,
            account_id: self.account_id,
            kind: self.kind,
            amount: self.amount,
            description: format!("{} (Recurring)", self.description),
            category: self.category.clone(),
            date: now,
            is_recurring: false,
            recurring_interval: None,
            last_processed: None,
            next_occurrence_date: None,
            status: TransactionStatus::Completed,
            created_at: now,
            updated_at: now,
        }
    }

    /// Enforce model invariants before the row reaches the store.
    pub fn validate(&self) -> EngineResult<()> {
        if self.amount.is_sign_negative() {
            return Err(EngineError::Validation(format!(
                "transaction amount must be non-negative, got {}",
                self.amount
            )));
        }
        money::to_minor(self.amount)?;
        if self.is_recurring && self.recurring_interval.is_none() {
            return Err(EngineError::Validation(
                "recurring transaction requires an interval".to_string(),
            ));
        }
        if !self.is_recurring
            && (self.recurring_interval.is_some() || self.next_occurrence_date.is_some())
        {
            return Err(EngineError::Validation(
                "non-recurring transaction must not carry scheduling state".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn template(amount: Decimal) -> Transaction {
        Transaction::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            TransactionKind::Expense,
            amount,
            utc(2024, 1, 1),
        )
        .recurring(RecurringInterval::Monthly)
    }

    #[test]
    fn never_processed_template_is_due() {
        let t = template(Decimal::new(5000, 2));
        assert!(t.is_due(utc(2024, 3, 1)));
    }

    #[test]
    fn template_due_only_when_next_date_arrives() {
        let mut t = template(Decimal::new(5000, 2));
        t.last_processed = Some(utc(2024, 3, 1));
        t.next_occurrence_date = Some(utc(2024, 4, 1));
        assert!(!t.is_due(utc(2024, 3, 15)));
        assert!(t.is_due(utc(2024, 4, 1)));
        assert!(t.is_due(utc(2024, 4, 2)));
    }

    #[test]
    fn non_recurring_is_never_due() {
        let t = Transaction::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            TransactionKind::Expense,
            Decimal::ONE,
            utc(2024, 1, 1),
        );
        assert!(!t.is_due(utc(2024, 3, 1)));
    }

    #[test]
    fn pending_template_is_not_due() {
        let mut t = template(Decimal::ONE);
        t.status = TransactionStatus::Pending;
        assert!(!t.is_due(utc(2024, 3, 1)));
    }

    #[test]
    fn signed_delta_follows_kind() {
        let mut t = template(Decimal::new(5000, 2));
        assert_eq!(t.signed_delta(), Decimal::new(-5000, 2));
        t.kind = TransactionKind::Income;
        assert_eq!(t.signed_delta(), Decimal::new(5000, 2));
    }

    #[test]
    fn spawn_occurrence_is_non_recurring_and_marked() {
        let t = template(Decimal::new(5000, 2)).with_description("Rent");
        let occ = t.spawn_occurrence(utc(2024, 3, 1));
        assert!(!occ.is_recurring);
        assert!(occ.recurring_interval.is_none());
        assert!(occ.next_occurrence_date.is_none());
        assert_eq!(occ.date, utc(2024, 3, 1));
        assert_eq!(occ.amount, t.amount);
        assert_eq!(occ.account_id, t.account_id);
        assert!(occ.description.ends_with("(Recurring)"));
        occ.validate().unwrap();
    }

    #[test]
    fn validate_rejects_interval_mismatch() {
        let mut t = template(Decimal::ONE);
        t.recurring_interval = None;
        assert!(t.validate().is_err());

        let mut plain = Transaction::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            TransactionKind::Income,
            Decimal::ONE,
            utc(2024, 1, 1),
        );
        plain.next_occurrence_date = Some(utc(2024, 2, 1));
        assert!(plain.validate().is_err());
    }
}
