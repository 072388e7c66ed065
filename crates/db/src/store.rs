//! Storage facade for the pipelines.
//!
//! [`VideoStore`] gathers the persistence operations the generation and
//! revision pipelines depend on behind one trait, so pipeline code runs
//! against Postgres in production and an in-memory fake in tests.

use async_trait::async_trait;
use reelgen_core::script::ScriptScene;
use reelgen_core::types::DbId;

use crate::models::music::{Music, UpsertMusic};
use crate::models::revision::Revision;
use crate::models::scene::{Scene, UpdateScene};
use crate::models::status::VideoStatus;
use crate::models::video::Video;
use crate::repositories::{MusicRepo, RevisionRepo, SceneRepo, VideoRepo};
use crate::DbPool;

/// Errors surfaced by [`VideoStore`] implementations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistence operations used by the generation and revision pipelines.
///
/// Lookup methods return [`StoreError::NotFound`] rather than `Option` so
/// pipeline code can propagate a missing row with `?`.
#[async_trait]
pub trait VideoStore: Send + Sync {
    /// Fetch a video by ID.
    async fn get_video(&self, id: DbId) -> Result<Video, StoreError>;

    /// Persist a pipeline status. Written before the stage's work begins.
    async fn set_status(&self, id: DbId, status: VideoStatus) -> Result<(), StoreError>;

    /// Mark a video `completed` with its final artifact URL.
    async fn set_completed(&self, id: DbId, final_video_url: &str) -> Result<(), StoreError>;

    /// Mark a video `failed` with an error message.
    async fn set_failed(&self, id: DbId, error: &str) -> Result<(), StoreError>;

    /// Replace a video's scene rows with a freshly generated script.
    async fn replace_scenes(
        &self,
        video_id: DbId,
        scenes: &[ScriptScene],
    ) -> Result<Vec<Scene>, StoreError>;

    /// List a video's scenes ordered by scene number.
    async fn list_scenes(&self, video_id: DbId) -> Result<Vec<Scene>, StoreError>;

    /// Apply a partial update to one scene, returning the updated row.
    async fn update_scene(
        &self,
        scene_id: DbId,
        changes: &UpdateScene,
    ) -> Result<Scene, StoreError>;

    /// Insert or replace a video's music row.
    async fn upsert_music(&self, video_id: DbId, music: &UpsertMusic) -> Result<Music, StoreError>;

    /// Fetch a video's music row, if one exists yet.
    async fn get_music(&self, video_id: DbId) -> Result<Option<Music>, StoreError>;

    /// Fetch a revision by ID.
    async fn get_revision(&self, id: DbId) -> Result<Revision, StoreError>;

    /// Mark a revision `completed` with its result artifact URL.
    async fn complete_revision(&self, id: DbId, result_video_url: &str) -> Result<(), StoreError>;

    /// Mark a revision `failed` with an error message.
    async fn fail_revision(&self, id: DbId, error: &str) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// Postgres implementation
// ---------------------------------------------------------------------------

/// Postgres-backed [`VideoStore`] delegating to the repository layer.
#[derive(Clone)]
pub struct PgVideoStore {
    pool: DbPool,
}

impl PgVideoStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VideoStore for PgVideoStore {
    async fn get_video(&self, id: DbId) -> Result<Video, StoreError> {
        VideoRepo::find_by_id(&self.pool, id)
            .await?
            .ok_or(StoreError::NotFound { entity: "video", id })
    }

    async fn set_status(&self, id: DbId, status: VideoStatus) -> Result<(), StoreError> {
        Ok(VideoRepo::set_status(&self.pool, id, status).await?)
    }

    async fn set_completed(&self, id: DbId, final_video_url: &str) -> Result<(), StoreError> {
        Ok(VideoRepo::set_completed(&self.pool, id, final_video_url).await?)
    }

    async fn set_failed(&self, id: DbId, error: &str) -> Result<(), StoreError> {
        Ok(VideoRepo::set_failed(&self.pool, id, error).await?)
    }

    async fn replace_scenes(
        &self,
        video_id: DbId,
        scenes: &[ScriptScene],
    ) -> Result<Vec<Scene>, StoreError> {
        Ok(SceneRepo::replace_for_video(&self.pool, video_id, scenes).await?)
    }

    async fn list_scenes(&self, video_id: DbId) -> Result<Vec<Scene>, StoreError> {
        Ok(SceneRepo::list_by_video(&self.pool, video_id).await?)
    }

    async fn update_scene(
        &self,
        scene_id: DbId,
        changes: &UpdateScene,
    ) -> Result<Scene, StoreError> {
        SceneRepo::update(&self.pool, scene_id, changes)
            .await?
            .ok_or(StoreError::NotFound { entity: "scene", id: scene_id })
    }

    async fn upsert_music(&self, video_id: DbId, music: &UpsertMusic) -> Result<Music, StoreError> {
        Ok(MusicRepo::upsert(&self.pool, video_id, music).await?)
    }

    async fn get_music(&self, video_id: DbId) -> Result<Option<Music>, StoreError> {
        Ok(MusicRepo::find_by_video(&self.pool, video_id).await?)
    }

    async fn get_revision(&self, id: DbId) -> Result<Revision, StoreError> {
        RevisionRepo::find_by_id(&self.pool, id)
            .await?
            .ok_or(StoreError::NotFound { entity: "revision", id })
    }

    async fn complete_revision(&self, id: DbId, result_video_url: &str) -> Result<(), StoreError> {
        Ok(RevisionRepo::complete(&self.pool, id, result_video_url).await?)
    }

    async fn fail_revision(&self, id: DbId, error: &str) -> Result<(), StoreError> {
        Ok(RevisionRepo::fail(&self.pool, id, error).await?)
    }
}
