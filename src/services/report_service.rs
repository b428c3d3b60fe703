//! Monthly report service: aggregates a user's month, asks the insight
//! collaborator for prose, and hands the rendered report to the sink.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::calendar;
use crate::domain::errors::EngineResult;
use crate::domain::models::report::fallback_insights;
use crate::domain::models::{MonthlyStats, User};
use crate::domain::ports::{InsightGenerator, LedgerStore, Notifier};

pub struct ReportService<S: LedgerStore> {
    store: Arc<S>,
    notifier: Arc<dyn Notifier>,
    insights: Arc<dyn InsightGenerator>,
}

impl<S: LedgerStore> ReportService<S> {
    pub fn new(
        store: Arc<S>,
        notifier: Arc<dyn Notifier>,
        insights: Arc<dyn InsightGenerator>,
    ) -> Self {
        Self {
            store,
            notifier,
            insights,
        }
    }

    /// Aggregate one user's statistics for the month containing `at`.
    pub async fn monthly_stats(
        &self,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> EngineResult<MonthlyStats> {
        let window = calendar::month_window(at);
        let transactions = self.store.transactions_in_window(user_id, window).await?;
        Ok(MonthlyStats::from_transactions(&transactions))
    }

    /// Generate and send previous-month reports for every user.
    ///
    /// Per-user failures are logged and the loop continues; collaborator
    /// failures degrade (static insights, skipped delivery) and never
    /// abort the run. Returns the number of reports sent.
    pub async fn run(&self, now: DateTime<Utc>) -> EngineResult<usize> {
        let window = calendar::previous_month_window(now);
        let label = calendar::month_label(window.0);
        let users = self.store.users().await?;
        let mut sent = 0;

        for user in users {
            match self.report_for(&user, window, &label).await {
                Ok(()) => sent += 1,
                Err(err) => {
                    tracing::error!(user_id = %user.id, error = %err, "monthly report failed");
                }
            }
        }

        tracing::info!(sent, month = %label, "monthly report run complete");
        Ok(sent)
    }

    async fn report_for(
        &self,
        user: &User,
        window: (DateTime<Utc>, DateTime<Utc>),
        label: &str,
    ) -> EngineResult<()> {
        let transactions = self.store.transactions_in_window(user.id, window).await?;
        let stats = MonthlyStats::from_transactions(&transactions);

        let insights = match self.insights.generate(&stats, label).await {
            Ok(list) if !list.is_empty() => list,
            Ok(_) => {
                tracing::warn!(user_id = %user.id, "insight generator returned nothing, using fallback");
                fallback_insights()
            }
            Err(err) => {
                tracing::warn!(user_id = %user.id, error = %err, "insight generation failed, using fallback");
                fallback_insights()
            }
        };

        let subject = format!("Your Monthly Financial Report for {label}");
        let body = render_report(user, &stats, label, &insights);

        if let Err(err) = self.notifier.send(&user.email, &subject, &body).await {
            tracing::warn!(user_id = %user.id, error = %err, "report delivery failed");
        }
        Ok(())
    }
}

fn render_report(user: &User, stats: &MonthlyStats, label: &str, insights: &[String]) -> String {
    let mut body = format!(
        "Hello {},\n\n\
         Here is your financial summary for {}:\n\n\
         Total Income:   {}\n\
         Total Expenses: {}\n\
         Net:            {}\n",
        user.name,
        label,
        stats.total_income,
        stats.total_expenses,
        stats.net()
    );

    if !stats.by_category.is_empty() {
        body.push_str("\nExpenses by Category:\n");
        for (category, amount) in &stats.by_category {
            body.push_str(&format!("  {category}: {amount}\n"));
        }
    }

    body.push_str("\nInsights:\n");
    for insight in insights {
        body.push_str(&format!("  - {insight}\n"));
    }
    body
}
