//! Repository for the `scenes` table.

use sqlx::PgPool;
use reelgen_core::script::ScriptScene;
use reelgen_core::types::DbId;

use crate::models::scene::{Scene, UpdateScene};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, video_id, scene_number, visual_description, voiceover, \
    sound_effects, music_direction, shot_type, image_url, scene_clip_url, \
    voiceover_url, created_at, updated_at";

/// Provides CRUD operations for scenes.
pub struct SceneRepo;

impl SceneRepo {
    /// Replace a video's scenes with a freshly accepted script.
    ///
    /// Deleting before inserting keeps re-delivered generation tasks from
    /// accumulating duplicate scene rows. Rows are returned in
    /// `scene_number` order.
    pub async fn replace_for_video(
        pool: &PgPool,
        video_id: DbId,
        script: &[ScriptScene],
    ) -> Result<Vec<Scene>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM scenes WHERE video_id = $1")
            .bind(video_id)
            .execute(&mut *tx)
            .await?;

        let insert = format!(
            "INSERT INTO scenes
                (video_id, scene_number, visual_description, voiceover,
                 sound_effects, music_direction, shot_type)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        let mut created = Vec::with_capacity(script.len());
        for scene in script {
            let row = sqlx::query_as::<_, Scene>(&insert)
                .bind(video_id)
                .bind(scene.scene_number)
                .bind(&scene.visual_description)
                .bind(&scene.voiceover)
                .bind(&scene.sound_effects)
                .bind(&scene.music_direction)
                .bind(&scene.shot_type)
                .fetch_one(&mut *tx)
                .await?;
            created.push(row);
        }

        tx.commit().await?;
        created.sort_by_key(|s| s.scene_number);
        Ok(created)
    }

    /// List all scenes for a video, ordered by scene number ascending.
    pub async fn list_by_video(pool: &PgPool, video_id: DbId) -> Result<Vec<Scene>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM scenes
             WHERE video_id = $1
             ORDER BY scene_number ASC"
        );
        sqlx::query_as::<_, Scene>(&query)
            .bind(video_id)
            .fetch_all(pool)
            .await
    }

    /// Find a scene by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Scene>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM scenes WHERE id = $1");
        sqlx::query_as::<_, Scene>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Update a scene. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateScene,
    ) -> Result<Option<Scene>, sqlx::Error> {
        let query = format!(
            "UPDATE scenes SET
                visual_description = COALESCE($2, visual_description),
                voiceover = COALESCE($3, voiceover),
                sound_effects = COALESCE($4, sound_effects),
                music_direction = COALESCE($5, music_direction),
                shot_type = COALESCE($6, shot_type),
                image_url = COALESCE($7, image_url),
                scene_clip_url = COALESCE($8, scene_clip_url),
                voiceover_url = COALESCE($9, voiceover_url),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Scene>(&query)
            .bind(id)
            .bind(&input.visual_description)
            .bind(&input.voiceover)
            .bind(&input.sound_effects)
            .bind(&input.music_direction)
            .bind(&input.shot_type)
            .bind(&input.image_url)
            .bind(&input.scene_clip_url)
            .bind(&input.voiceover_url)
            .fetch_optional(pool)
            .await
    }
}
