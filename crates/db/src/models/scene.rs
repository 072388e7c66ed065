//! Scene entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use reelgen_core::script::SceneSnapshot;
use reelgen_core::types::{DbId, Timestamp};

/// A row from the `scenes` table. Exactly five per video, ordered by
/// `scene_number` (1-based, unique within the video).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Scene {
    pub id: DbId,
    pub video_id: DbId,
    pub scene_number: i32,
    // -- Script fields --
    pub visual_description: Option<String>,
    pub voiceover: Option<String>,
    pub sound_effects: Option<String>,
    pub music_direction: Option<String>,
    pub shot_type: Option<String>,
    // -- Derived artifacts, populated progressively by the pipeline --
    /// Scene-specific enhanced image.
    pub image_url: Option<String>,
    /// Synthesized clip for this scene's segment.
    pub scene_clip_url: Option<String>,
    /// Synthesized narration. Empty string means synthesis was degraded.
    pub voiceover_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Scene {
    /// Text-field view consumed by prompt builders and intent extraction.
    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            scene_number: self.scene_number,
            visual_description: self.visual_description.clone(),
            voiceover: self.voiceover.clone(),
            shot_type: self.shot_type.clone(),
            sound_effects: self.sound_effects.clone(),
            music_direction: self.music_direction.clone(),
        }
    }
}

/// DTO for updating an existing scene. All fields are optional; only
/// non-`None` fields are applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateScene {
    pub visual_description: Option<String>,
    pub voiceover: Option<String>,
    pub sound_effects: Option<String>,
    pub music_direction: Option<String>,
    pub shot_type: Option<String>,
    pub image_url: Option<String>,
    pub scene_clip_url: Option<String>,
    pub voiceover_url: Option<String>,
}
