//! Occurrence dispatch event.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::{EngineError, EngineResult};

/// Ephemeral message fanning out one due recurring template for processing.
///
/// Delivered at-least-once by the dispatch substrate; the handler is
/// idempotent, so duplicates are harmless. Fields are optional because the
/// payload arrives from the wire and must be validated before use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OccurrenceEvent {
    pub template_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
}

impl OccurrenceEvent {
    pub fn new(template_id: Uuid, user_id: Uuid) -> Self {
        Self {
            template_id: Some(template_id),
            user_id: Some(user_id),
        }
    }

    /// Extract the required identifiers, failing on a malformed payload.
    pub fn validate(&self) -> EngineResult<(Uuid, Uuid)> {
        match (self.template_id, self.user_id) {
            (Some(template_id), Some(user_id)) => Ok((template_id, user_id)),
            _ => Err(EngineError::Validation(
                "occurrence event missing required identifiers".to_string(),
            )),
        }
    }
}
