//! Domain errors for the ledgerd scheduling engine.

use thiserror::Error;
use uuid::Uuid;

/// Domain-level errors that can occur while processing scheduled work.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Recurring template not found: {0}")]
    TemplateNotFound(Uuid),

    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    #[error("Budget not found: {0}")]
    BudgetNotFound(Uuid),

    #[error("User not found: {0}")]
    UserNotFound(Uuid),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Transient store failure: {0}")]
    TransientStore(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Notification failed: {0}")]
    Notification(String),

    #[error("Insight generation failed: {0}")]
    InsightGeneration(String),

    #[error("Invalid schedule expression '{expression}': {reason}")]
    InvalidSchedule { expression: String, reason: String },
}

pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    /// Whether the dispatch substrate should retry the failed unit of work.
    ///
    /// Only aborted/contended store transactions are retryable. Validation
    /// and not-found failures are terminal for the event: redelivering the
    /// same payload would fail identically.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransientStore(_))
    }

    /// Whether the error should abort the surrounding sweep or report run.
    ///
    /// Collaborator failures (notification, insights) degrade gracefully
    /// and never propagate past the unit that observed them.
    pub fn is_degradable(&self) -> bool {
        matches!(self, Self::Notification(_) | Self::InsightGeneration(_))
    }
}

impl From<sqlx::Error> for EngineError {
    fn from(err: sqlx::Error) -> Self {
        // SQLITE_BUSY / SQLITE_LOCKED surface as database errors with a
        // "locked" message; those aborts are safe to retry.
        if let sqlx::Error::Database(db) = &err {
            let msg = db.message().to_lowercase();
            if msg.contains("locked") || msg.contains("busy") {
                return EngineError::TransientStore(err.to_string());
            }
        }
        EngineError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_store_is_retryable() {
        assert!(EngineError::TransientStore("database is locked".into()).is_retryable());
        assert!(!EngineError::Validation("missing ids".into()).is_retryable());
        assert!(!EngineError::TemplateNotFound(Uuid::new_v4()).is_retryable());
        assert!(!EngineError::Database("constraint".into()).is_retryable());
    }

    #[test]
    fn collaborator_failures_are_degradable() {
        assert!(EngineError::Notification("sink down".into()).is_degradable());
        assert!(EngineError::InsightGeneration("bad json".into()).is_degradable());
        assert!(!EngineError::TransientStore("busy".into()).is_degradable());
    }
}
