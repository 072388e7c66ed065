//! Repository for the `videos` table.
//!
//! Status transitions that act as gates (retry, revision intake) are
//! expressed as conditional UPDATEs so the gate and the write are one
//! atomic statement.

use sqlx::PgPool;
use reelgen_core::types::DbId;

use crate::models::status::VideoStatus;
use crate::models::video::{CreateVideo, Video, VideoListQuery};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, chat_id, prompt, image_url, status, \
    final_video_url, error_message, created_at, updated_at";

/// Maximum page size for video listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for video listing.
const DEFAULT_LIMIT: i64 = 50;

/// Provides CRUD operations and status transitions for videos.
pub struct VideoRepo;

impl VideoRepo {
    /// Insert a new video in `pending` status, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateVideo) -> Result<Video, sqlx::Error> {
        let query = format!(
            "INSERT INTO videos (user_id, chat_id, prompt, image_url, status)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Video>(&query)
            .bind(&input.user_id)
            .bind(&input.chat_id)
            .bind(&input.prompt)
            .bind(&input.image_url)
            .bind(VideoStatus::Pending)
            .fetch_one(pool)
            .await
    }

    /// Find a video by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Video>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM videos WHERE id = $1");
        sqlx::query_as::<_, Video>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a user's videos, newest first, with optional status filter.
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: &str,
        params: &VideoListQuery,
    ) -> Result<Vec<Video>, sqlx::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
        let offset = params.offset.unwrap_or(0);

        let mut conditions = vec!["user_id = $1".to_string()];
        let mut bind_idx: u32 = 2;

        if params.status.is_some() {
            conditions.push(format!("status = ${bind_idx}"));
            bind_idx += 1;
        }

        let query = format!(
            "SELECT {COLUMNS} FROM videos
             WHERE {}
             ORDER BY created_at DESC
             LIMIT ${bind_idx} OFFSET ${}",
            conditions.join(" AND "),
            bind_idx + 1,
        );

        let mut q = sqlx::query_as::<_, Video>(&query).bind(user_id);
        if let Some(status) = params.status {
            q = q.bind(status);
        }
        q.bind(limit).bind(offset).fetch_all(pool).await
    }

    /// Persist a new pipeline status. Written before the stage's work
    /// begins so the row always names the last attempted stage.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status: VideoStatus,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE videos SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Record a successful run: final artifact, `completed` status, error
    /// cleared.
    pub async fn set_completed(
        pool: &PgPool,
        id: DbId,
        final_video_url: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE videos
             SET status = $2, final_video_url = $3, error_message = NULL, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(VideoStatus::Completed)
        .bind(final_video_url)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Record a failed run. Idempotent: safe to call again on an already
    /// failed video.
    pub async fn set_failed(pool: &PgPool, id: DbId, error: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE videos SET status = $2, error_message = $3, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(VideoStatus::Failed)
        .bind(error)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Reset a failed video for another run: `failed` -> `pending`, error
    /// cleared. Returns `false` when the video is not in `failed` status.
    pub async fn reset_for_retry(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE videos
             SET status = $2, error_message = NULL, updated_at = NOW()
             WHERE id = $1 AND status = $3",
        )
        .bind(id)
        .bind(VideoStatus::Pending)
        .bind(VideoStatus::Failed)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Flip a completed video to `revision_requested`. Returns `false`
    /// when the video is not in `completed` status, which also rejects a
    /// second concurrent revision request.
    pub async fn request_revision(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE videos SET status = $2, updated_at = NOW() WHERE id = $1 AND status = $3",
        )
        .bind(id)
        .bind(VideoStatus::RevisionRequested)
        .bind(VideoStatus::Completed)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a video. Scenes, music, and revisions cascade with it.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM videos WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
