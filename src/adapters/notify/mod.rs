//! Notification sink adapters.
//!
//! The engine treats notification delivery as fire-and-forget: a failed
//! send maps to `EngineError::Notification`, which callers log and never
//! retry.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::errors::{EngineError, EngineResult};
use crate::domain::ports::Notifier;

/// Sink that writes notifications to the tracing log. Default for local
/// runs and tests.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> EngineResult<()> {
        tracing::info!(recipient, subject, body_len = body.len(), "notification sent");
        tracing::debug!(body, "notification body");
        Ok(())
    }
}

#[derive(Serialize)]
struct WebhookMessage<'a> {
    recipient: &'a str,
    subject: &'a str,
    body: &'a str,
}

/// Sink that POSTs each notification as JSON to a configured endpoint
/// (an email relay or similar delivery service sits behind it).
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> EngineResult<()> {
        let message = WebhookMessage {
            recipient,
            subject,
            body,
        };
        let response = self
            .client
            .post(&self.url)
            .json(&message)
            .send()
            .await
            .map_err(|e| EngineError::Notification(e.to_string()))?;

        if !response.status().is_success() {
            return Err(EngineError::Notification(format!(
                "webhook returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}
