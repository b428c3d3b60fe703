//! Service layer: the engine logic that sits between the CLI and the
//! storage/notification adapters.

pub mod budget_monitor;
pub mod dispatcher;
pub mod recurrence_engine;
pub mod report_service;
pub mod retry;

pub use budget_monitor::{BudgetCheck, BudgetMonitor};
pub use dispatcher::{Dispatcher, JobKind};
pub use recurrence_engine::{RecurrenceEngine, SweepSummary};
pub use report_service::ReportService;
pub use retry::RetryPolicy;
