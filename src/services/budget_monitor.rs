//! Budget monitor: detects monthly budget-threshold crossings and emits
//! at most one alert per budget per calendar month.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::calendar;
use crate::domain::errors::EngineResult;
use crate::domain::models::{Account, Budget, User};
use crate::domain::ports::{LedgerStore, Notifier};

/// What happened for one budget during a monitor pass.
#[derive(Debug, Clone)]
pub struct BudgetCheck {
    pub budget_id: Uuid,
    pub spent: Decimal,
    pub percentage_used: Decimal,
    pub alerted: bool,
}

pub struct BudgetMonitor<S: LedgerStore> {
    store: Arc<S>,
    notifier: Arc<dyn Notifier>,
    threshold: Decimal,
}

impl<S: LedgerStore> BudgetMonitor<S> {
    pub fn new(store: Arc<S>, notifier: Arc<dyn Notifier>, threshold_percent: u32) -> Self {
        Self {
            store,
            notifier,
            threshold: Decimal::from(threshold_percent),
        }
    }

    /// Check every monitored budget against its current-month spend.
    ///
    /// Read-mostly: the only write is the per-budget alert timestamp, so
    /// budgets process independently and the pass is safe to over-schedule.
    pub async fn run(&self, now: DateTime<Utc>) -> EngineResult<Vec<BudgetCheck>> {
        let budgets = self.store.budgets().await?;
        let mut checks = Vec::with_capacity(budgets.len());

        for budget in budgets {
            let Some(account) = self.store.default_account(budget.user_id).await? else {
                tracing::debug!(budget_id = %budget.id, "no default account, skipping");
                continue;
            };
            checks.push(self.check_budget(&budget, &account, now).await?);
        }

        let alerted = checks.iter().filter(|c| c.alerted).count();
        tracing::info!(budgets = checks.len(), alerted, "budget monitor pass complete");
        Ok(checks)
    }

    async fn check_budget(
        &self,
        budget: &Budget,
        account: &Account,
        now: DateTime<Utc>,
    ) -> EngineResult<BudgetCheck> {
        let window = calendar::month_window(now);
        let spent = self.store.expense_total(account.id, window).await?;
        let percentage_used = budget.percentage_used(spent);

        let crossed = percentage_used >= self.threshold;
        let suppressed = !calendar::is_new_period(budget.last_alert_sent, now);

        if !crossed || suppressed {
            // No write on the quiet path keeps repeated sweeps cheap.
            return Ok(BudgetCheck {
                budget_id: budget.id,
                spent,
                percentage_used,
                alerted: false,
            });
        }

        let user = self.store.user(budget.user_id).await?;
        let (subject, body) = render_alert(&user, account, budget, spent, percentage_used);

        // Fire-and-forget: a sink failure is logged, never retried, and
        // does not block recording the alert for this period.
        if let Err(err) = self.notifier.send(&user.email, &subject, &body).await {
            tracing::warn!(budget_id = %budget.id, error = %err, "budget alert delivery failed");
        }

        self.store.record_alert(budget.id, now).await?;
        tracing::info!(
            budget_id = %budget.id,
            %percentage_used,
            "budget alert recorded"
        );

        Ok(BudgetCheck {
            budget_id: budget.id,
            spent,
            percentage_used,
            alerted: true,
        })
    }
}

fn render_alert(
    user: &User,
    account: &Account,
    budget: &Budget,
    spent: Decimal,
    percentage_used: Decimal,
) -> (String, String) {
    let remaining = budget.amount - spent;
    let subject = format!("Budget Alert for Account {}", account.name);
    let body = format!(
        "Hello {},\n\n\
         You've used {:.1}% of your monthly budget.\n\n\
         Budget Amount: {}\n\
         Spent So Far:  {}\n\
         Remaining:     {}\n",
        user.name, percentage_used, budget.amount, spent, remaining
    );
    (subject, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::User;

    #[test]
    fn alert_body_carries_budget_figures() {
        let user = User::new("sam@example.com", "Sam");
        let account = Account::new(user.id, "Checking", Decimal::ZERO).as_default();
        let budget = Budget::new(user.id, Decimal::new(20000, 2));
        let spent = Decimal::new(17000, 2);

        let (subject, body) = render_alert(&user, &account, &budget, spent, Decimal::from(85));
        assert!(subject.contains("Checking"));
        assert!(body.contains("85.0%"));
        assert!(body.contains("200.00"));
        assert!(body.contains("170.00"));
        assert!(body.contains("30.00"));
    }
}
