pub mod account;
pub mod budget;
pub mod config;
pub mod event;
pub mod money;
pub mod report;
pub mod transaction;
pub mod user;

pub use account::Account;
pub use budget::Budget;
pub use config::{
    AlertConfig, Config, DatabaseConfig, DispatchConfig, InsightConfig, LoggingConfig,
    NotifierConfig, RetryConfig,
};
pub use event::OccurrenceEvent;
pub use report::MonthlyStats;
pub use transaction::{RecurringInterval, Transaction, TransactionKind, TransactionStatus};
pub use user::User;
