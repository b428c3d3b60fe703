//! SQLite adapter for the LedgerStore port.
//!
//! Monetary columns are integer minor units so balance deltas are applied
//! with `balance_minor = balance_minor + ?`, an atomic increment at the
//! store level, never a read-modify-write from application memory.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::adapters::sqlite::{fmt_datetime, parse_datetime, parse_optional_datetime, parse_uuid};
use crate::domain::errors::{EngineError, EngineResult};
use crate::domain::models::money;
use crate::domain::models::transaction::{RecurringInterval, TransactionKind, TransactionStatus};
use crate::domain::models::{Account, Budget, Transaction, User};
use crate::domain::ports::ledger_store::{LedgerStore, OccurrencePosting, PostingOutcome};

#[derive(Clone)]
pub struct SqliteLedgerStore {
    pool: SqlitePool,
}

impl SqliteLedgerStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Insert a user row. Used by seeding and tests; user identity is
    /// otherwise owned by an external collaborator.
    pub async fn create_user(&self, user: &User) -> EngineResult<()> {
        sqlx::query(
            "INSERT INTO users (id, email, name, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(user.id.to_string())
        .bind(&user.email)
        .bind(&user.name)
        .bind(fmt_datetime(user.created_at))
        .bind(fmt_datetime(user.updated_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn create_account(&self, account: &Account) -> EngineResult<()> {
        sqlx::query(
            "INSERT INTO accounts (id, user_id, name, balance_minor, is_default, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(account.id.to_string())
        .bind(account.user_id.to_string())
        .bind(&account.name)
        .bind(money::to_minor(account.balance)?)
        .bind(account.is_default as i32)
        .bind(fmt_datetime(account.created_at))
        .bind(fmt_datetime(account.updated_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn create_transaction(&self, txn: &Transaction) -> EngineResult<()> {
        txn.validate()?;
        insert_transaction(&self.pool, txn).await
    }

    pub async fn create_budget(&self, budget: &Budget) -> EngineResult<()> {
        sqlx::query(
            "INSERT INTO budgets (id, user_id, amount_minor, last_alert_sent, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(budget.id.to_string())
        .bind(budget.user_id.to_string())
        .bind(money::to_minor(budget.amount)?)
        .bind(budget.last_alert_sent.map(fmt_datetime))
        .bind(fmt_datetime(budget.created_at))
        .bind(fmt_datetime(budget.updated_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get_transaction(&self, id: Uuid) -> EngineResult<Option<Transaction>> {
        let row: Option<TransactionRow> =
            sqlx::query_as("SELECT * FROM transactions WHERE id = ?1")
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await?;
        row.map(row_to_transaction).transpose()
    }

    pub async fn get_budget(&self, id: Uuid) -> EngineResult<Budget> {
        let row: Option<BudgetRow> = sqlx::query_as("SELECT * FROM budgets WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.map(row_to_budget)
            .transpose()?
            .ok_or(EngineError::BudgetNotFound(id))
    }
}

#[derive(sqlx::FromRow)]
struct TransactionRow {
    id: String,
    user_id: String,
    account_id: String,
    kind: String,
    amount_minor: i64,
    description: String,
    category: String,
    date: String,
    is_recurring: i64,
    recurring_interval: Option<String>,
    last_processed: Option<String>,
    next_occurrence_date: Option<String>,
    status: String,
    created_at: String,
    updated_at: String,
}

fn row_to_transaction(row: TransactionRow) -> EngineResult<Transaction> {
    Ok(Transaction {
        id: parse_uuid(&row.id)?,
        user_id: parse_uuid(&row.user_id)?,
        account_id: parse_uuid(&row.account_id)?,
        kind: TransactionKind::from_str(&row.kind)
            .ok_or_else(|| EngineError::Serialization(format!("kind: {}", row.kind)))?,
        amount: money::from_minor(row.amount_minor),
        description: row.description,
        category: row.category,
        date: parse_datetime(&row.date)?,
        is_recurring: row.is_recurring != 0,
        recurring_interval: row
            .recurring_interval
            .as_deref()
            .and_then(RecurringInterval::from_str),
        last_processed: parse_optional_datetime(row.last_processed)?,
        next_occurrence_date: parse_optional_datetime(row.next_occurrence_date)?,
        status: TransactionStatus::from_str(&row.status).unwrap_or(TransactionStatus::Completed),
        created_at: parse_datetime(&row.created_at)?,
        updated_at: parse_datetime(&row.updated_at)?,
    })
}

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: String,
    user_id: String,
    name: String,
    balance_minor: i64,
    is_default: i64,
    created_at: String,
    updated_at: String,
}

fn row_to_account(row: AccountRow) -> EngineResult<Account> {
    Ok(Account {
        id: parse_uuid(&row.id)?,
        user_id: parse_uuid(&row.user_id)?,
        name: row.name,
        balance: money::from_minor(row.balance_minor),
        is_default: row.is_default != 0,
        created_at: parse_datetime(&row.created_at)?,
        updated_at: parse_datetime(&row.updated_at)?,
    })
}

#[derive(sqlx::FromRow)]
struct BudgetRow {
    id: String,
    user_id: String,
    amount_minor: i64,
    last_alert_sent: Option<String>,
    created_at: String,
    updated_at: String,
}

fn row_to_budget(row: BudgetRow) -> EngineResult<Budget> {
    Ok(Budget {
        id: parse_uuid(&row.id)?,
        user_id: parse_uuid(&row.user_id)?,
        amount: money::from_minor(row.amount_minor),
        last_alert_sent: parse_optional_datetime(row.last_alert_sent)?,
        created_at: parse_datetime(&row.created_at)?,
        updated_at: parse_datetime(&row.updated_at)?,
    })
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    email: String,
    name: String,
    created_at: String,
    updated_at: String,
}

fn row_to_user(row: UserRow) -> EngineResult<User> {
    Ok(User {
        id: parse_uuid(&row.id)?,
        email: row.email,
        name: row.name,
        created_at: parse_datetime(&row.created_at)?,
        updated_at: parse_datetime(&row.updated_at)?,
    })
}

async fn insert_transaction<'e, E>(executor: E, txn: &Transaction) -> EngineResult<()>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    sqlx::query(
        "INSERT INTO transactions
         (id, user_id, account_id, kind, amount_minor, description, category, date,
          is_recurring, recurring_interval, last_processed, next_occurrence_date,
          status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
    )
    .bind(txn.id.to_string())
    .bind(txn.user_id.to_string())
    .bind(txn.account_id.to_string())
    .bind(txn.kind.as_str())
    .bind(money::to_minor(txn.amount)?)
    .bind(&txn.description)
    .bind(&txn.category)
    .bind(fmt_datetime(txn.date))
    .bind(txn.is_recurring as i32)
    .bind(txn.recurring_interval.map(|i| i.as_str()))
    .bind(txn.last_processed.map(fmt_datetime))
    .bind(txn.next_occurrence_date.map(fmt_datetime))
    .bind(txn.status.as_str())
    .bind(fmt_datetime(txn.created_at))
    .bind(fmt_datetime(txn.updated_at))
    .execute(executor)
    .await?;
    Ok(())
}

#[async_trait]
impl LedgerStore for SqliteLedgerStore {
    async fn due_templates(&self, now: DateTime<Utc>) -> EngineResult<Vec<Transaction>> {
        let rows: Vec<TransactionRow> = sqlx::query_as(
            "SELECT * FROM transactions
             WHERE is_recurring = 1 AND status = 'completed'
               AND (last_processed IS NULL OR next_occurrence_date <= ?1)
             ORDER BY date ASC",
        )
        .bind(fmt_datetime(now))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(row_to_transaction).collect()
    }

    async fn fetch_template(
        &self,
        template_id: Uuid,
        user_id: Uuid,
    ) -> EngineResult<Transaction> {
        let row: Option<TransactionRow> = sqlx::query_as(
            "SELECT * FROM transactions WHERE id = ?1 AND user_id = ?2 AND is_recurring = 1",
        )
        .bind(template_id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?;
        row.map(row_to_transaction)
            .transpose()?
            .ok_or(EngineError::TemplateNotFound(template_id))
    }

    async fn commit_occurrence(
        &self,
        posting: OccurrencePosting,
        now: DateTime<Utc>,
    ) -> EngineResult<PostingOutcome> {
        posting.occurrence.validate()?;
        let delta_minor = money::to_minor(posting.balance_delta)?;

        let mut tx = self.pool.begin().await?;

        // Re-validate due-ness with a conditional write. If a prior
        // delivery already advanced the schedule, zero rows match and the
        // whole posting becomes a committed no-op.
        let advanced = sqlx::query(
            "UPDATE transactions
             SET last_processed = ?1, next_occurrence_date = ?2, updated_at = ?3
             WHERE id = ?4 AND user_id = ?5
               AND is_recurring = 1 AND status = 'completed'
               AND (last_processed IS NULL OR next_occurrence_date <= ?6)",
        )
        .bind(fmt_datetime(posting.last_processed))
        .bind(fmt_datetime(posting.next_occurrence_date))
        .bind(fmt_datetime(now))
        .bind(posting.template_id.to_string())
        .bind(posting.user_id.to_string())
        .bind(fmt_datetime(now))
        .execute(&mut *tx)
        .await?;

        if advanced.rows_affected() == 0 {
            tx.rollback().await?;
            let exists: Option<(String,)> = sqlx::query_as(
                "SELECT id FROM transactions
                 WHERE id = ?1 AND user_id = ?2 AND is_recurring = 1",
            )
            .bind(posting.template_id.to_string())
            .bind(posting.user_id.to_string())
            .fetch_optional(&self.pool)
            .await?;
            return match exists {
                Some(_) => Ok(PostingOutcome::NotDue),
                None => Err(EngineError::TemplateNotFound(posting.template_id)),
            };
        }

        insert_transaction(&mut *tx, &posting.occurrence).await?;

        let updated = sqlx::query(
            "UPDATE accounts
             SET balance_minor = balance_minor + ?1, updated_at = ?2
             WHERE id = ?3",
        )
        .bind(delta_minor)
        .bind(fmt_datetime(now))
        .bind(posting.occurrence.account_id.to_string())
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(EngineError::AccountNotFound(posting.occurrence.account_id));
        }

        tx.commit().await?;
        Ok(PostingOutcome::Posted(posting.occurrence))
    }

    async fn account(&self, id: Uuid) -> EngineResult<Account> {
        let row: Option<AccountRow> = sqlx::query_as("SELECT * FROM accounts WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.map(row_to_account)
            .transpose()?
            .ok_or(EngineError::AccountNotFound(id))
    }

    async fn default_account(&self, user_id: Uuid) -> EngineResult<Option<Account>> {
        let row: Option<AccountRow> =
            sqlx::query_as("SELECT * FROM accounts WHERE user_id = ?1 AND is_default = 1")
                .bind(user_id.to_string())
                .fetch_optional(&self.pool)
                .await?;
        row.map(row_to_account).transpose()
    }

    async fn budgets(&self) -> EngineResult<Vec<Budget>> {
        let rows: Vec<BudgetRow> = sqlx::query_as("SELECT * FROM budgets ORDER BY created_at")
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(row_to_budget).collect()
    }

    async fn expense_total(
        &self,
        account_id: Uuid,
        window: (DateTime<Utc>, DateTime<Utc>),
    ) -> EngineResult<Decimal> {
        let (total,): (i64,) = sqlx::query_as(
            "SELECT COALESCE(SUM(amount_minor), 0) FROM transactions
             WHERE account_id = ?1 AND kind = 'expense' AND date >= ?2 AND date < ?3",
        )
        .bind(account_id.to_string())
        .bind(fmt_datetime(window.0))
        .bind(fmt_datetime(window.1))
        .fetch_one(&self.pool)
        .await?;
        Ok(money::from_minor(total))
    }

    async fn record_alert(&self, budget_id: Uuid, at: DateTime<Utc>) -> EngineResult<()> {
        let updated = sqlx::query(
            "UPDATE budgets SET last_alert_sent = ?1, updated_at = ?2 WHERE id = ?3",
        )
        .bind(fmt_datetime(at))
        .bind(fmt_datetime(at))
        .bind(budget_id.to_string())
        .execute(&self.pool)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(EngineError::BudgetNotFound(budget_id));
        }
        Ok(())
    }

    async fn user(&self, id: Uuid) -> EngineResult<User> {
        let row: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.map(row_to_user)
            .transpose()?
            .ok_or(EngineError::UserNotFound(id))
    }

    async fn users(&self) -> EngineResult<Vec<User>> {
        let rows: Vec<UserRow> = sqlx::query_as("SELECT * FROM users ORDER BY created_at")
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(row_to_user).collect()
    }

    async fn transactions_in_window(
        &self,
        user_id: Uuid,
        window: (DateTime<Utc>, DateTime<Utc>),
    ) -> EngineResult<Vec<Transaction>> {
        let rows: Vec<TransactionRow> = sqlx::query_as(
            "SELECT * FROM transactions
             WHERE user_id = ?1 AND date >= ?2 AND date < ?3
             ORDER BY date ASC",
        )
        .bind(user_id.to_string())
        .bind(fmt_datetime(window.0))
        .bind(fmt_datetime(window.1))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(row_to_transaction).collect()
    }
}
