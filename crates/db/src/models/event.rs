//! Persisted lifecycle event model.

use serde::Serialize;
use sqlx::FromRow;
use reelgen_core::types::{DbId, Timestamp};

/// A row from the `events` table: one pipeline lifecycle event, written
/// by the event-persistence subscriber as an operational audit trail.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StoredEvent {
    pub id: DbId,
    pub event_type: String,
    /// Video the event concerns, when applicable.
    pub video_id: Option<DbId>,
    pub payload: serde_json::Value,
    pub created_at: Timestamp,
}
