//! Repository for the `events` table.

use sqlx::PgPool;
use reelgen_core::types::DbId;

use crate::models::event::StoredEvent;

/// Column list for `events` queries.
const EVENT_COLUMNS: &str = "id, event_type, video_id, payload, created_at";

/// Provides read/write operations for persisted lifecycle events.
pub struct EventRepo;

impl EventRepo {
    /// Insert a new event row, returning the generated ID.
    pub async fn insert(
        pool: &PgPool,
        event_type: &str,
        video_id: Option<DbId>,
        payload: &serde_json::Value,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO events (event_type, video_id, payload) \
             VALUES ($1, $2, $3) \
             RETURNING id",
        )
        .bind(event_type)
        .bind(video_id)
        .bind(payload)
        .fetch_one(pool)
        .await
    }

    /// List a video's events ordered newest-first. Surfaced for
    /// debugging a video's pipeline history.
    pub async fn list_by_video(
        pool: &PgPool,
        video_id: DbId,
        limit: i64,
    ) -> Result<Vec<StoredEvent>, sqlx::Error> {
        let query = format!(
            "SELECT {EVENT_COLUMNS} FROM events \
             WHERE video_id = $1 ORDER BY created_at DESC LIMIT $2"
        );
        sqlx::query_as::<_, StoredEvent>(&query)
            .bind(video_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
