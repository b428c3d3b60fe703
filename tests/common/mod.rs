#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use tokio::sync::Mutex;

use ledgerd::adapters::sqlite::{create_migrated_test_pool, SqliteLedgerStore};
use ledgerd::domain::errors::{EngineError, EngineResult};
use ledgerd::domain::models::{
    Account, Budget, MonthlyStats, RecurringInterval, Transaction, TransactionKind, User,
};
use ledgerd::domain::ports::{InsightGenerator, Notifier};

pub async fn test_store() -> Arc<SqliteLedgerStore> {
    let pool = create_migrated_test_pool()
        .await
        .expect("failed to create test pool");
    Arc::new(SqliteLedgerStore::new(pool))
}

pub fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

/// Seed one user with a default account holding `balance`.
pub async fn seed_user(store: &SqliteLedgerStore, balance: Decimal) -> (User, Account) {
    let user = User::new("sam@example.com", "Sam");
    store.create_user(&user).await.expect("create user");

    let account = Account::new(user.id, "Checking", balance).as_default();
    store.create_account(&account).await.expect("create account");

    (user, account)
}

/// A monthly recurring expense template that has never been processed.
pub fn monthly_expense_template(
    user: &User,
    account: &Account,
    amount: Decimal,
    date: DateTime<Utc>,
) -> Transaction {
    Transaction::new(user.id, account.id, TransactionKind::Expense, amount, date)
        .with_description("Streaming subscription")
        .with_category("entertainment")
        .recurring(RecurringInterval::Monthly)
}

/// Notifier that records every message it is asked to send.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(String, String, String)>>,
}

impl RecordingNotifier {
    pub async fn count(&self) -> usize {
        self.sent.lock().await.len()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> EngineResult<()> {
        self.sent.lock().await.push((
            recipient.to_string(),
            subject.to_string(),
            body.to_string(),
        ));
        Ok(())
    }
}

/// Notifier that always fails delivery.
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send(&self, _recipient: &str, _subject: &str, _body: &str) -> EngineResult<()> {
        Err(EngineError::Notification("sink unavailable".to_string()))
    }
}

/// Insight generator that always fails.
pub struct FailingInsights;

#[async_trait]
impl InsightGenerator for FailingInsights {
    async fn generate(&self, _stats: &MonthlyStats, _period: &str) -> EngineResult<Vec<String>> {
        Err(EngineError::InsightGeneration("model offline".to_string()))
    }
}

pub fn budget_of(user: &User, amount: Decimal) -> Budget {
    Budget::new(user.id, amount)
}
