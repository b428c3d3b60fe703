mod common;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use ledgerd::adapters::sqlite::create_migrated_test_pool;
use ledgerd::domain::errors::EngineError;
use ledgerd::domain::models::{Transaction, TransactionKind};
use ledgerd::domain::ports::{LedgerStore, OccurrencePosting, PostingOutcome};

use common::{monthly_expense_template, seed_user, test_store, utc};

#[tokio::test]
async fn migrations_create_the_schema() {
    let pool = create_migrated_test_pool().await.expect("migrated pool");

    let (version,): (i64,) =
        sqlx::query_as("SELECT COALESCE(MAX(version), 0) FROM schema_migrations")
            .fetch_one(&pool)
            .await
            .expect("version query");
    assert!(version >= 1);

    for table in ["users", "accounts", "transactions", "budgets"] {
        let count: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&pool)
            .await
            .unwrap_or_else(|_| panic!("table {table} should exist"));
        assert_eq!(count.0, 0);
    }
}

fn posting_for(template: &Transaction, now: DateTime<Utc>, next: DateTime<Utc>) -> OccurrencePosting {
    let occurrence = template.spawn_occurrence(now);
    OccurrencePosting {
        template_id: template.id,
        user_id: template.user_id,
        balance_delta: occurrence.signed_delta(),
        occurrence,
        last_processed: now,
        next_occurrence_date: next,
    }
}

#[tokio::test]
async fn commit_is_a_no_op_once_the_schedule_has_advanced() {
    let store = test_store().await;
    let (user, account) = seed_user(&store, Decimal::new(50_000, 2)).await;

    let template =
        monthly_expense_template(&user, &account, Decimal::new(5_000, 2), utc(2024, 2, 1, 0));
    store.create_transaction(&template).await.expect("create");

    let now = utc(2024, 3, 1, 0);
    let next = utc(2024, 4, 1, 0);

    let first = store
        .commit_occurrence(posting_for(&template, now, next), now)
        .await
        .expect("first commit");
    assert!(first.is_posted());

    let second = store
        .commit_occurrence(posting_for(&template, now, next), now)
        .await
        .expect("second commit");
    assert!(matches!(second, PostingOutcome::NotDue));

    let account = store.account(account.id).await.expect("account");
    assert_eq!(account.balance, Decimal::new(45_000, 2));
}

#[tokio::test]
async fn missing_account_rolls_back_the_whole_posting() {
    let store = test_store().await;

    // Foreign keys would reject the dangling account reference at insert
    // time; switch them off so the store's own rollback path is reachable.
    sqlx::query("PRAGMA foreign_keys = OFF")
        .execute(store.pool())
        .await
        .expect("pragma");

    let (user, account) = seed_user(&store, Decimal::new(50_000, 2)).await;

    let mut template =
        monthly_expense_template(&user, &account, Decimal::new(5_000, 2), utc(2024, 2, 1, 0));
    template.account_id = Uuid::new_v4();
    store.create_transaction(&template).await.expect("create");

    let now = utc(2024, 3, 1, 0);
    let err = store
        .commit_occurrence(posting_for(&template, now, utc(2024, 4, 1, 0)), now)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::AccountNotFound(_)));

    // Nothing persisted: the schedule advance was rolled back too.
    let template = store
        .fetch_template(template.id, user.id)
        .await
        .expect("template");
    assert_eq!(template.last_processed, None);

    let rows = store
        .transactions_in_window(user.id, (utc(2024, 3, 1, 0), utc(2024, 4, 1, 0)))
        .await
        .expect("window");
    assert!(rows.iter().all(|t| t.is_recurring), "no occurrence row");
}

#[tokio::test]
async fn commit_for_unknown_template_reports_not_found() {
    let store = test_store().await;
    let (user, account) = seed_user(&store, Decimal::new(50_000, 2)).await;

    // Built but never inserted.
    let template =
        monthly_expense_template(&user, &account, Decimal::new(5_000, 2), utc(2024, 2, 1, 0));

    let now = utc(2024, 3, 1, 0);
    let err = store
        .commit_occurrence(posting_for(&template, now, utc(2024, 4, 1, 0)), now)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::TemplateNotFound(_)));
}

#[tokio::test]
async fn fetch_template_is_scoped_to_its_owner() {
    let store = test_store().await;
    let (user, account) = seed_user(&store, Decimal::ZERO).await;

    let template =
        monthly_expense_template(&user, &account, Decimal::new(5_000, 2), utc(2024, 2, 1, 0));
    store.create_transaction(&template).await.expect("create");

    let err = store
        .fetch_template(template.id, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::TemplateNotFound(_)));
}

#[tokio::test]
async fn expense_total_respects_the_half_open_window() {
    let store = test_store().await;
    let (user, account) = seed_user(&store, Decimal::ZERO).await;

    let window = (utc(2024, 3, 1, 0), utc(2024, 4, 1, 0));
    let rows = [
        // At the window start: included.
        (TransactionKind::Expense, 1_000i64, utc(2024, 3, 1, 0)),
        (TransactionKind::Expense, 2_000, utc(2024, 3, 15, 12)),
        // At the window end: excluded.
        (TransactionKind::Expense, 4_000, utc(2024, 4, 1, 0)),
        // Income never counts toward spend.
        (TransactionKind::Income, 8_000, utc(2024, 3, 10, 0)),
    ];
    for (kind, amount, date) in rows {
        let txn = Transaction::new(user.id, account.id, kind, Decimal::new(amount, 2), date);
        store.create_transaction(&txn).await.expect("create");
    }

    let total = store.expense_total(account.id, window).await.expect("total");
    assert_eq!(total, Decimal::new(3_000, 2));

    // Another account's spend is invisible.
    let total = store
        .expense_total(Uuid::new_v4(), window)
        .await
        .expect("total");
    assert_eq!(total, Decimal::ZERO);
}

#[tokio::test]
async fn record_alert_for_unknown_budget_fails() {
    let store = test_store().await;
    let err = store
        .record_alert(Uuid::new_v4(), utc(2024, 3, 1, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::BudgetNotFound(_)));
}

#[tokio::test]
async fn rejects_amounts_with_sub_cent_precision() {
    let store = test_store().await;
    let (user, account) = seed_user(&store, Decimal::ZERO).await;

    let txn = Transaction::new(
        user.id,
        account.id,
        TransactionKind::Expense,
        Decimal::new(10_005, 3),
        utc(2024, 3, 1, 0),
    );
    let err = store.create_transaction(&txn).await.unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}
