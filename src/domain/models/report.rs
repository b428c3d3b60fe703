//! Monthly report aggregation.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::models::transaction::{Transaction, TransactionKind};

/// Aggregated statistics for one user and one calendar month.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonthlyStats {
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    /// Expense totals keyed by category. BTreeMap keeps rendering stable.
    pub by_category: BTreeMap<String, Decimal>,
    pub transaction_count: usize,
}

/// Fixed fallback used whenever the insight collaborator fails or returns
/// something unusable. Exactly three generic strings.
pub fn fallback_insights() -> Vec<String> {
    vec![
        "Your highest expense category this month might need attention.".to_string(),
        "Consider setting up a budget for better financial management.".to_string(),
        "Track your recurring expenses to identify potential savings.".to_string(),
    ]
}

impl MonthlyStats {
    /// Pure aggregation over the month's transactions.
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let mut stats = Self {
            transaction_count: transactions.len(),
            ..Self::default()
        };
        for txn in transactions {
            match txn.kind {
                TransactionKind::Expense => {
                    stats.total_expenses += txn.amount;
                    *stats
                        .by_category
                        .entry(txn.category.clone())
                        .or_insert(Decimal::ZERO) += txn.amount;
                }
                TransactionKind::Income => stats.total_income += txn.amount,
            }
        }
        stats
    }

    pub fn net(&self) -> Decimal {
        self.total_income - self.total_expenses
    }
}
