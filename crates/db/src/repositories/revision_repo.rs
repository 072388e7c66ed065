//! Repository for the `video_revisions` table. Append-only history.

use sqlx::PgPool;
use reelgen_core::types::DbId;

use crate::models::revision::{CreateRevision, Revision};
use crate::models::status::RevisionStatus;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, video_id, revision_request, revision_type, status, \
    result_video_url, target_scene_number, error_message, created_at, completed_at";

/// Provides CRUD operations for revisions.
pub struct RevisionRepo;

impl RevisionRepo {
    /// Insert a new pending revision, returning the created row.
    ///
    /// `revision_type` defaults to `'general'` if omitted.
    pub async fn create(pool: &PgPool, input: &CreateRevision) -> Result<Revision, sqlx::Error> {
        let query = format!(
            "INSERT INTO video_revisions
                (video_id, revision_request, revision_type, status, target_scene_number)
             VALUES ($1, $2, COALESCE($3, 'general'), $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Revision>(&query)
            .bind(input.video_id)
            .bind(&input.revision_request)
            .bind(&input.revision_type)
            .bind(RevisionStatus::Pending)
            .bind(input.target_scene_number)
            .fetch_one(pool)
            .await
    }

    /// Find a revision by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Revision>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM video_revisions WHERE id = $1");
        sqlx::query_as::<_, Revision>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all revisions for a video, newest first.
    pub async fn list_by_video(
        pool: &PgPool,
        video_id: DbId,
    ) -> Result<Vec<Revision>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM video_revisions
             WHERE video_id = $1
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Revision>(&query)
            .bind(video_id)
            .fetch_all(pool)
            .await
    }

    /// Mark a revision completed with its resulting artifact.
    pub async fn complete(
        pool: &PgPool,
        id: DbId,
        result_video_url: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE video_revisions
             SET status = $2, result_video_url = $3, error_message = NULL,
                 completed_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(RevisionStatus::Completed)
        .bind(result_video_url)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Mark a revision failed with the error text.
    pub async fn fail(pool: &PgPool, id: DbId, error: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE video_revisions
             SET status = $2, error_message = $3, completed_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(RevisionStatus::Failed)
        .bind(error)
        .execute(pool)
        .await?;
        Ok(())
    }
}
