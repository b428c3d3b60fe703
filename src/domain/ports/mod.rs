pub mod insights;
pub mod ledger_store;
pub mod notifier;

pub use insights::InsightGenerator;
pub use ledger_store::{LedgerStore, OccurrencePosting, PostingOutcome};
pub use notifier::Notifier;
