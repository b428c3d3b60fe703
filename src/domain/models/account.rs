//! Account domain model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A ledger account holding a running balance.
///
/// The balance is a derived value: within this engine it is mutated only
/// through the store's atomic increment during occurrence posting, never
/// by a read-modify-write from application memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub balance: Decimal,
    /// At most one account per user carries this flag; budgets are
    /// implicitly scoped to it.
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn new(user_id: Uuid, name: impl Into<String>, balance: Decimal) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            name: name.into(),
            balance,
            is_default: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }
}
