//! Budget domain model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A monthly spending limit, implicitly scoped to the owning user's
/// default account.
///
/// Invariant: at most one alert is recorded as sent per calendar month,
/// tracked through `last_alert_sent`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Monetary limit for a calendar month of expenses.
    pub amount: Decimal,
    pub last_alert_sent: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Budget {
    pub fn new(user_id: Uuid, amount: Decimal) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            amount,
            last_alert_sent: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Share of the limit consumed by `spent`, as a percentage.
    ///
    /// A zero limit cannot be divided; any positive spend against it is
    /// reported as fully consumed.
    pub fn percentage_used(&self, spent: Decimal) -> Decimal {
        if self.amount.is_zero() {
            if spent > Decimal::ZERO {
                Decimal::from(100)
            } else {
                Decimal::ZERO
            }
        } else {
            spent * Decimal::from(100) / self.amount
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_is_exact_decimal() {
        let budget = Budget::new(Uuid::new_v4(), Decimal::new(20000, 2)); // 200.00
        assert_eq!(
            budget.percentage_used(Decimal::new(17000, 2)),
            Decimal::from(85)
        );
        assert_eq!(
            budget.percentage_used(Decimal::new(5000, 2)),
            Decimal::from(25)
        );
    }

    #[test]
    fn zero_limit_does_not_divide() {
        let budget = Budget::new(Uuid::new_v4(), Decimal::ZERO);
        assert_eq!(budget.percentage_used(Decimal::ONE), Decimal::from(100));
        assert_eq!(budget.percentage_used(Decimal::ZERO), Decimal::ZERO);
    }
}
