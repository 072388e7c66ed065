//! Repository for the `music` table. One row per video, replaced
//! wholesale on regeneration.

use sqlx::PgPool;
use reelgen_core::types::DbId;

use crate::models::music::{Music, UpsertMusic};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, video_id, music_prompt, music_url, processed_music_url, created_at, updated_at";

/// Provides upsert and lookup for a video's music record.
pub struct MusicRepo;

impl MusicRepo {
    /// Create or replace the music record for a video.
    pub async fn upsert(
        pool: &PgPool,
        video_id: DbId,
        input: &UpsertMusic,
    ) -> Result<Music, sqlx::Error> {
        let query = format!(
            "INSERT INTO music (video_id, music_prompt, music_url, processed_music_url)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (video_id) DO UPDATE SET
                music_prompt = EXCLUDED.music_prompt,
                music_url = EXCLUDED.music_url,
                processed_music_url = EXCLUDED.processed_music_url,
                updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Music>(&query)
            .bind(video_id)
            .bind(&input.music_prompt)
            .bind(&input.music_url)
            .bind(&input.processed_music_url)
            .fetch_one(pool)
            .await
    }

    /// Find the music record for a video, if any.
    pub async fn find_by_video(
        pool: &PgPool,
        video_id: DbId,
    ) -> Result<Option<Music>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM music WHERE video_id = $1");
        sqlx::query_as::<_, Music>(&query)
            .bind(video_id)
            .fetch_optional(pool)
            .await
    }
}
