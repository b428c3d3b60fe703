//! Ledgerd - Recurring Transaction and Budget Alert Engine
//!
//! Ledgerd is the background scheduling engine of a personal finance
//! ledger: it posts recurring transactions on schedule, watches monthly
//! budgets for threshold crossings, and sends monthly financial reports.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Pure business logic, models and ports
//! - **Service Layer** (`services`): Engine logic coordination
//! - **Adapters Layer** (`adapters`): SQLite storage, notification sinks,
//!   insight generators
//! - **Infrastructure Layer** (`infrastructure`): Configuration loading
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use ledgerd::services::RecurrenceEngine;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Wire a store and run one sweep
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{EngineError, EngineResult};
pub use domain::models::{
    Account, Budget, Config, DatabaseConfig, DispatchConfig, LoggingConfig, MonthlyStats,
    OccurrenceEvent, RecurringInterval, RetryConfig, Transaction, TransactionKind,
    TransactionStatus, User,
};
pub use domain::ports::{
    InsightGenerator, LedgerStore, Notifier, OccurrencePosting, PostingOutcome,
};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{BudgetMonitor, Dispatcher, RecurrenceEngine, ReportService, RetryPolicy};
