//! Insight generator adapters.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

use crate::domain::errors::{EngineError, EngineResult};
use crate::domain::models::MonthlyStats;
use crate::domain::ports::InsightGenerator;

/// Offline generator returning the same generic insights the report
/// service falls back to. Default when no endpoint is configured.
#[derive(Debug, Default, Clone)]
pub struct StaticInsightGenerator;

#[async_trait]
impl InsightGenerator for StaticInsightGenerator {
    async fn generate(
        &self,
        _stats: &MonthlyStats,
        _period_label: &str,
    ) -> EngineResult<Vec<String>> {
        Ok(crate::domain::models::report::fallback_insights())
    }
}

#[derive(Serialize)]
struct InsightRequest<'a> {
    stats: &'a MonthlyStats,
    period: &'a str,
}

/// Generator backed by an HTTP text-generation service. The response must
/// be a JSON array of strings; anything else is an
/// `EngineError::InsightGeneration`, which the report service degrades to
/// the static fallback.
pub struct HttpInsightGenerator {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpInsightGenerator {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> EngineResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EngineError::InsightGeneration(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl InsightGenerator for HttpInsightGenerator {
    async fn generate(
        &self,
        stats: &MonthlyStats,
        period_label: &str,
    ) -> EngineResult<Vec<String>> {
        let request = InsightRequest {
            stats,
            period: period_label,
        };
        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| EngineError::InsightGeneration(e.to_string()))?;

        if !response.status().is_success() {
            return Err(EngineError::InsightGeneration(format!(
                "insight endpoint returned {}",
                response.status()
            )));
        }

        let insights: Vec<String> = response
            .json()
            .await
            .map_err(|e| EngineError::InsightGeneration(format!("malformed response: {e}")))?;

        if insights.is_empty() {
            return Err(EngineError::InsightGeneration(
                "insight endpoint returned an empty list".to_string(),
            ));
        }
        Ok(insights)
    }
}
