//! Music entity model and DTOs. At most one row per video.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use reelgen_core::types::{DbId, Timestamp};

/// A row from the `music` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Music {
    pub id: DbId,
    pub video_id: DbId,
    /// The combined direction text actually submitted for synthesis.
    pub music_prompt: Option<String>,
    pub music_url: Option<String>,
    /// Loudness-normalized track used in composition.
    pub processed_music_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating or wholesale-replacing a video's music record.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertMusic {
    pub music_prompt: String,
    pub music_url: String,
    pub processed_music_url: String,
}
