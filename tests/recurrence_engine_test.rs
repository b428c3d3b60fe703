mod common;

use rust_decimal::Decimal;
use uuid::Uuid;

use ledgerd::domain::calendar;
use ledgerd::domain::errors::EngineError;
use ledgerd::domain::models::{OccurrenceEvent, RecurringInterval, Transaction, TransactionKind};
use ledgerd::domain::ports::LedgerStore;
use ledgerd::services::RecurrenceEngine;

use common::{monthly_expense_template, seed_user, test_store, utc};

#[tokio::test]
async fn posts_due_occurrence_and_advances_schedule() {
    let store = test_store().await;
    let (user, account) = seed_user(&store, Decimal::new(100_000, 2)).await;

    let template =
        monthly_expense_template(&user, &account, Decimal::new(5_000, 2), utc(2024, 2, 1, 0));
    store.create_transaction(&template).await.expect("create template");

    let engine = RecurrenceEngine::new(store.clone());
    let now = utc(2024, 3, 1, 0);
    let event = OccurrenceEvent::new(template.id, user.id);

    let outcome = engine.process_occurrence(&event, now).await.expect("process");
    assert!(outcome.is_posted());

    // One new non-recurring row, dated now, with the recurring suffix.
    let window = calendar::month_window(now);
    let occurrences: Vec<Transaction> = store
        .transactions_in_window(user.id, window)
        .await
        .expect("window query")
        .into_iter()
        .filter(|t| !t.is_recurring)
        .collect();
    assert_eq!(occurrences.len(), 1);
    let occurrence = &occurrences[0];
    assert_eq!(occurrence.amount, Decimal::new(5_000, 2));
    assert_eq!(occurrence.description, "Streaming subscription (Recurring)");
    assert_eq!(occurrence.category, "entertainment");
    assert_eq!(occurrence.date, now);
    assert_eq!(occurrence.kind, TransactionKind::Expense);

    // Expense decremented the balance.
    let account = store.account(account.id).await.expect("account");
    assert_eq!(account.balance, Decimal::new(95_000, 2));

    // Schedule advanced by one month, at midnight.
    let template = store
        .fetch_template(template.id, user.id)
        .await
        .expect("template");
    assert_eq!(template.last_processed, Some(now));
    assert_eq!(template.next_occurrence_date, Some(utc(2024, 4, 1, 0)));
}

#[tokio::test]
async fn income_template_increments_balance() {
    let store = test_store().await;
    let (user, account) = seed_user(&store, Decimal::new(10_000, 2)).await;

    let template = Transaction::new(
        user.id,
        account.id,
        TransactionKind::Income,
        Decimal::new(250_000, 2),
        utc(2024, 2, 1, 0),
    )
    .with_description("Salary")
    .recurring(RecurringInterval::Monthly);
    store.create_transaction(&template).await.expect("create template");

    let engine = RecurrenceEngine::new(store.clone());
    let event = OccurrenceEvent::new(template.id, user.id);
    let outcome = engine
        .process_occurrence(&event, utc(2024, 3, 1, 0))
        .await
        .expect("process");
    assert!(outcome.is_posted());

    let account = store.account(account.id).await.expect("account");
    assert_eq!(account.balance, Decimal::new(260_000, 2));
}

#[tokio::test]
async fn duplicate_delivery_is_a_committed_no_op() {
    let store = test_store().await;
    let (user, account) = seed_user(&store, Decimal::new(100_000, 2)).await;

    let template =
        monthly_expense_template(&user, &account, Decimal::new(5_000, 2), utc(2024, 2, 1, 0));
    store.create_transaction(&template).await.expect("create template");

    let engine = RecurrenceEngine::new(store.clone());
    let now = utc(2024, 3, 1, 0);
    let event = OccurrenceEvent::new(template.id, user.id);

    let first = engine.process_occurrence(&event, now).await.expect("first");
    assert!(first.is_posted());

    // Redelivery of the same event: nothing more is written.
    let second = engine.process_occurrence(&event, now).await.expect("second");
    assert!(!second.is_posted());

    let occurrences: Vec<Transaction> = store
        .transactions_in_window(user.id, calendar::month_window(now))
        .await
        .expect("window query")
        .into_iter()
        .filter(|t| !t.is_recurring)
        .collect();
    assert_eq!(occurrences.len(), 1, "exactly one occurrence row");

    let account = store.account(account.id).await.expect("account");
    assert_eq!(account.balance, Decimal::new(95_000, 2), "one deduction only");
}

#[tokio::test]
async fn balance_matches_sum_of_postings_over_many_periods() {
    let store = test_store().await;
    let (user, account) = seed_user(&store, Decimal::new(100_000, 2)).await;

    let template =
        monthly_expense_template(&user, &account, Decimal::new(2_500, 2), utc(2024, 1, 1, 0));
    store.create_transaction(&template).await.expect("create template");

    let engine = RecurrenceEngine::new(store.clone());
    let event = OccurrenceEvent::new(template.id, user.id);

    // Advance through six monthly periods, each at its due instant.
    let mut posted = 0;
    for month in 1..=6u32 {
        let now = utc(2024, month, 1, 0);
        let outcome = engine.process_occurrence(&event, now).await.expect("process");
        if outcome.is_posted() {
            posted += 1;
        }
    }
    assert_eq!(posted, 6);

    let account = store.account(account.id).await.expect("account");
    assert_eq!(
        account.balance,
        Decimal::new(100_000 - 6 * 2_500, 2),
        "balance reflects every posted occurrence exactly once"
    );
}

#[tokio::test]
async fn not_yet_due_template_is_skipped() {
    let store = test_store().await;
    let (user, account) = seed_user(&store, Decimal::new(100_000, 2)).await;

    let mut template =
        monthly_expense_template(&user, &account, Decimal::new(5_000, 2), utc(2024, 2, 1, 0));
    template.last_processed = Some(utc(2024, 3, 1, 0));
    template.next_occurrence_date = Some(utc(2024, 4, 1, 0));
    store.create_transaction(&template).await.expect("create template");

    let engine = RecurrenceEngine::new(store.clone());
    let event = OccurrenceEvent::new(template.id, user.id);
    let outcome = engine
        .process_occurrence(&event, utc(2024, 3, 15, 0))
        .await
        .expect("process");
    assert!(!outcome.is_posted());

    let account = store.account(account.id).await.expect("account");
    assert_eq!(account.balance, Decimal::new(100_000, 2));
}

#[tokio::test]
async fn unknown_template_fails_with_not_found() {
    let store = test_store().await;
    let (user, _) = seed_user(&store, Decimal::ZERO).await;

    let engine = RecurrenceEngine::new(store.clone());
    let event = OccurrenceEvent::new(Uuid::new_v4(), user.id);
    let err = engine
        .process_occurrence(&event, utc(2024, 3, 1, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::TemplateNotFound(_)));
}

#[tokio::test]
async fn malformed_event_fails_validation() {
    let store = test_store().await;
    let engine = RecurrenceEngine::new(store.clone());

    let event = OccurrenceEvent {
        template_id: Some(Uuid::new_v4()),
        user_id: None,
    };
    let err = engine
        .process_occurrence(&event, utc(2024, 3, 1, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn sweep_selects_only_due_recurring_templates() {
    let store = test_store().await;
    let (user, account) = seed_user(&store, Decimal::new(100_000, 2)).await;
    let now = utc(2024, 3, 1, 0);

    // Never processed: due.
    let never_run =
        monthly_expense_template(&user, &account, Decimal::new(1_000, 2), utc(2024, 1, 5, 0));
    store.create_transaction(&never_run).await.expect("create");

    // Processed, next date arrived: due.
    let mut arrived =
        monthly_expense_template(&user, &account, Decimal::new(2_000, 2), utc(2024, 1, 6, 0));
    arrived.last_processed = Some(utc(2024, 2, 1, 0));
    arrived.next_occurrence_date = Some(utc(2024, 3, 1, 0));
    store.create_transaction(&arrived).await.expect("create");

    // Processed, next date in the future: not due.
    let mut future =
        monthly_expense_template(&user, &account, Decimal::new(3_000, 2), utc(2024, 1, 7, 0));
    future.last_processed = Some(utc(2024, 2, 15, 0));
    future.next_occurrence_date = Some(utc(2024, 3, 15, 0));
    store.create_transaction(&future).await.expect("create");

    // Plain non-recurring transaction: never swept.
    let plain = Transaction::new(
        user.id,
        account.id,
        TransactionKind::Expense,
        Decimal::new(4_000, 2),
        utc(2024, 2, 20, 0),
    );
    store.create_transaction(&plain).await.expect("create");

    let engine = RecurrenceEngine::new(store.clone());
    let events = engine.sweep_due(now).await.expect("sweep");

    let mut due_ids: Vec<Uuid> = events.iter().filter_map(|e| e.template_id).collect();
    due_ids.sort();
    let mut expected = vec![never_run.id, arrived.id];
    expected.sort();
    assert_eq!(due_ids, expected);
}

#[tokio::test]
async fn sweep_and_process_reports_summary() {
    let store = test_store().await;
    let (user, account) = seed_user(&store, Decimal::new(100_000, 2)).await;

    for amount in [1_000i64, 2_000, 3_000] {
        let template = monthly_expense_template(
            &user,
            &account,
            Decimal::new(amount, 2),
            utc(2024, 2, 1, 0),
        );
        store.create_transaction(&template).await.expect("create");
    }

    let engine = RecurrenceEngine::new(store.clone());
    let summary = engine
        .sweep_and_process(utc(2024, 3, 1, 0))
        .await
        .expect("sweep");
    assert_eq!(summary.posted, 3);
    assert_eq!(summary.skipped, 0);
    assert_eq!(summary.failed, 0);

    let account = store.account(account.id).await.expect("account");
    assert_eq!(account.balance, Decimal::new(94_000, 2));
}
