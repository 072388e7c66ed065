//! Video entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use reelgen_core::types::{DbId, Timestamp};

use crate::models::status::VideoStatus;

/// A row from the `videos` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Video {
    pub id: DbId,
    pub user_id: String,
    /// Conversation the request originated from, for callback correlation.
    pub chat_id: Option<String>,
    pub prompt: Option<String>,
    /// Source product image supplied at intake.
    pub image_url: Option<String>,
    pub status: VideoStatus,
    pub final_video_url: Option<String>,
    pub error_message: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new video.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateVideo {
    pub user_id: String,
    pub chat_id: Option<String>,
    pub prompt: String,
    pub image_url: String,
}

/// Query parameters for listing a user's videos.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoListQuery {
    pub status: Option<VideoStatus>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
