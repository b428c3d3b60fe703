//! Insight generator port.

use async_trait::async_trait;

use crate::domain::errors::EngineResult;
use crate::domain::models::MonthlyStats;

/// Opaque prose-generation collaborator. On failure or malformed output
/// the caller substitutes a fixed fallback list; errors here never abort
/// report processing.
#[async_trait]
pub trait InsightGenerator: Send + Sync {
    async fn generate(&self, stats: &MonthlyStats, period_label: &str)
        -> EngineResult<Vec<String>>;
}
