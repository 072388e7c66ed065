//! Repository for the `tasks` table: the database-backed pipeline queue.
//!
//! Delivery is at least once. A claim increments `attempts` atomically,
//! and `FOR UPDATE SKIP LOCKED` keeps concurrent workers from dispatching
//! the same task twice. A worker that dies mid-task leaves the row in
//! `running`; [`TaskRepo::release_stale`] sweeps such rows back to
//! `pending` without resetting their attempt count.

use sqlx::PgPool;
use reelgen_core::types::DbId;

use crate::models::status::TaskStatus;
use crate::models::task::{RevisionTaskPayload, Task, TaskKind};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, kind, video_id, payload, status, attempts, max_attempts, \
    last_error, run_at, claimed_at, completed_at, created_at, updated_at";

/// Provides queue operations for pipeline tasks.
pub struct TaskRepo;

impl TaskRepo {
    /// Enqueue a generation run for a pending video.
    pub async fn enqueue_generation(pool: &PgPool, video_id: DbId) -> Result<Task, sqlx::Error> {
        let kind = TaskKind::GenerateVideo;
        let query = format!(
            "INSERT INTO tasks (kind, video_id, payload, max_attempts)
             VALUES ($1, $2, '{{}}'::jsonb, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(kind)
            .bind(video_id)
            .bind(kind.max_attempts())
            .fetch_one(pool)
            .await
    }

    /// Enqueue a revision run for a completed video.
    pub async fn enqueue_revision(
        pool: &PgPool,
        video_id: DbId,
        payload: &RevisionTaskPayload,
    ) -> Result<Task, sqlx::Error> {
        let kind = TaskKind::ProcessRevision;
        let value = serde_json::to_value(payload).map_err(|e| sqlx::Error::Encode(Box::new(e)))?;
        let query = format!(
            "INSERT INTO tasks (kind, video_id, payload, max_attempts)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(kind)
            .bind(video_id)
            .bind(value)
            .bind(kind.max_attempts())
            .fetch_one(pool)
            .await
    }

    /// Atomically claim the next due task, incrementing its attempt count.
    ///
    /// Uses `SELECT FOR UPDATE SKIP LOCKED` to prevent double-dispatch
    /// when multiple workers are running.
    pub async fn claim_next(pool: &PgPool) -> Result<Option<Task>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks
             SET status = $1, claimed_at = NOW(), attempts = attempts + 1,
                 updated_at = NOW()
             WHERE id = (
                 SELECT id FROM tasks
                 WHERE status = $2 AND run_at <= NOW()
                 ORDER BY run_at ASC, created_at ASC
                 LIMIT 1
                 FOR UPDATE SKIP LOCKED
             )
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(TaskStatus::Running)
            .bind(TaskStatus::Pending)
            .fetch_optional(pool)
            .await
    }

    /// Mark a task completed.
    pub async fn complete(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE tasks
             SET status = $2, completed_at = NOW(), updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(TaskStatus::Completed)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Return a failed attempt to the queue after a fixed delay.
    pub async fn reschedule(
        pool: &PgPool,
        id: DbId,
        delay_secs: i64,
        error: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE tasks
             SET status = $2, last_error = $3, claimed_at = NULL,
                 run_at = NOW() + make_interval(secs => $4),
                 updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(TaskStatus::Pending)
        .bind(error)
        .bind(delay_secs as f64)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Mark a task terminally failed.
    pub async fn fail(pool: &PgPool, id: DbId, error: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE tasks
             SET status = $2, last_error = $3, completed_at = NOW(), updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(TaskStatus::Failed)
        .bind(error)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Return `running` tasks whose worker has gone silent to `pending`.
    /// Returns the number of tasks released.
    pub async fn release_stale(pool: &PgPool, older_than_secs: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE tasks
             SET status = $1, claimed_at = NULL, updated_at = NOW()
             WHERE status = $2 AND claimed_at < NOW() - make_interval(secs => $3)",
        )
        .bind(TaskStatus::Pending)
        .bind(TaskStatus::Running)
        .bind(older_than_secs as f64)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Find a task by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE id = $1");
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
