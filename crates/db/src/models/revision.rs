//! Revision entity model and DTOs. Append-only history per video.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use reelgen_core::types::{DbId, Timestamp};

use crate::models::status::RevisionStatus;

/// A row from the `video_revisions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Revision {
    pub id: DbId,
    pub video_id: DbId,
    pub revision_request: String,
    /// Caller-supplied classification label, defaulting to `general`.
    pub revision_type: String,
    pub status: RevisionStatus,
    pub result_video_url: Option<String>,
    pub target_scene_number: Option<i32>,
    pub error_message: Option<String>,
    pub created_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}

/// DTO for creating a new revision record.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRevision {
    pub video_id: DbId,
    pub revision_request: String,
    pub revision_type: Option<String>,
    pub target_scene_number: Option<i32>,
}
