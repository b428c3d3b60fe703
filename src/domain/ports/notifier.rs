//! Notification sink port.

use async_trait::async_trait;

use crate::domain::errors::EngineResult;

/// Outbound notification sink, fire-and-forget from the engine's
/// perspective: failures are logged by the caller, never retried.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> EngineResult<()>;
}
