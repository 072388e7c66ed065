//! Stage primitives shared by the generation and revision pipelines.
//!
//! Each primitive runs one external capability call (or a short chain of
//! them) and persists the produced artifact reference before returning
//! the refreshed scene row. The pipelines sequence these primitives and
//! decide fan-out and failure policy; the primitives themselves stay
//! policy-free.

use std::sync::Arc;

use reelgen_core::prompt::{build_music_prompt, clip_prompt};
use reelgen_core::script::SceneSnapshot;
use reelgen_core::timeline::{music_track, voiceover_tracks};
use reelgen_core::types::DbId;
use reelgen_db::models::music::{Music, UpsertMusic};
use reelgen_db::models::scene::{Scene, UpdateScene};
use reelgen_db::VideoStore;
use reelgen_providers::{
    ClipGenerator, ImageEditor, MusicGenerator, SpeechSynthesizer, VideoComposer,
};

use crate::error::PipelineError;

/// Executes individual media stages against the injected capabilities,
/// persisting artifact references through the store as it goes.
pub struct StageRunner {
    store: Arc<dyn VideoStore>,
    images: Arc<dyn ImageEditor>,
    clips: Arc<dyn ClipGenerator>,
    speech: Arc<dyn SpeechSynthesizer>,
    music: Arc<dyn MusicGenerator>,
    composer: Arc<dyn VideoComposer>,
}

impl StageRunner {
    pub fn new(
        store: Arc<dyn VideoStore>,
        images: Arc<dyn ImageEditor>,
        clips: Arc<dyn ClipGenerator>,
        speech: Arc<dyn SpeechSynthesizer>,
        music: Arc<dyn MusicGenerator>,
        composer: Arc<dyn VideoComposer>,
    ) -> Self {
        Self {
            store,
            images,
            clips,
            speech,
            music,
            composer,
        }
    }

    /// Reframe the source image to the vertical aspect ratio. The result
    /// is carried in memory as the base for scene enhancement; it is not
    /// persisted on the video.
    pub async fn reframe_base_image(&self, image_url: &str) -> Result<String, PipelineError> {
        Ok(self.images.reframe(image_url).await?)
    }

    /// Materialize one scene: enhance the base image with the scene's
    /// visual description, persist the enhanced reference, then
    /// synthesize the scene clip from it.
    pub async fn materialize_scene(
        &self,
        base_image_url: &str,
        scene: &Scene,
    ) -> Result<Scene, PipelineError> {
        let visual = scene.visual_description.as_deref().unwrap_or_default();
        let enhanced_url = self.images.enhance(base_image_url, visual).await?;
        let scene = self
            .store
            .update_scene(
                scene.id,
                &UpdateScene {
                    image_url: Some(enhanced_url.clone()),
                    ..Default::default()
                },
            )
            .await?;
        self.synthesize_scene_clip(&enhanced_url, &scene).await
    }

    /// Synthesize one scene clip from `image_url` and persist it.
    pub async fn synthesize_scene_clip(
        &self,
        image_url: &str,
        scene: &Scene,
    ) -> Result<Scene, PipelineError> {
        let prompt = clip_prompt(
            scene.voiceover.as_deref().unwrap_or_default(),
            scene.visual_description.as_deref().unwrap_or_default(),
        );
        let clip_url = self.clips.generate_clip(image_url, &prompt).await?;
        Ok(self
            .store
            .update_scene(
                scene.id,
                &UpdateScene {
                    scene_clip_url: Some(clip_url),
                    ..Default::default()
                },
            )
            .await?)
    }

    /// Synthesize one scene's narration and persist it.
    pub async fn synthesize_voiceover(&self, scene: &Scene) -> Result<Scene, PipelineError> {
        let text = scene.voiceover.as_deref().unwrap_or_default();
        let audio_url = self.speech.synthesize(text).await?;
        Ok(self
            .store
            .update_scene(
                scene.id,
                &UpdateScene {
                    voiceover_url: Some(audio_url),
                    ..Default::default()
                },
            )
            .await?)
    }

    /// Record a degraded narration for a scene: an empty reference, which
    /// composition treats as "no track at this offset".
    pub async fn clear_voiceover(&self, scene: &Scene) -> Result<Scene, PipelineError> {
        Ok(self
            .store
            .update_scene(
                scene.id,
                &UpdateScene {
                    voiceover_url: Some(String::new()),
                    ..Default::default()
                },
            )
            .await?)
    }

    /// Generate the single global music track from every scene's current
    /// direction text, normalize its loudness, and upsert the video's
    /// music record.
    pub async fn generate_music(
        &self,
        video_id: DbId,
        scenes: &[Scene],
    ) -> Result<Music, PipelineError> {
        let snapshots: Vec<SceneSnapshot> = scenes.iter().map(Scene::snapshot).collect();
        let prompt = build_music_prompt(&snapshots);
        tracing::debug!(video_id = %video_id, prompt = %prompt, "Generating music");

        let raw_url = self.music.generate_music(&prompt).await?;
        let processed_url = self.composer.normalize_loudness(&raw_url).await?;

        Ok(self
            .store
            .upsert_music(
                video_id,
                &UpsertMusic {
                    music_prompt: prompt,
                    music_url: raw_url,
                    processed_music_url: processed_url,
                },
            )
            .await?)
    }

    /// Concatenate the scene clips in scene order and overlay narration
    /// and music. Every scene must carry a clip; narration tracks are
    /// placed at each scene's fixed offset and a missing or degraded
    /// narration leaves its slot silent without shifting the rest.
    pub async fn compose(
        &self,
        scenes: &[Scene],
        music: Option<&Music>,
    ) -> Result<String, PipelineError> {
        let mut ordered: Vec<&Scene> = scenes.iter().collect();
        ordered.sort_by_key(|s| s.scene_number);

        let mut clip_urls = Vec::with_capacity(ordered.len());
        for scene in &ordered {
            match scene.scene_clip_url.as_deref() {
                Some(url) if !url.is_empty() => clip_urls.push(url.to_string()),
                _ => {
                    return Err(PipelineError::Validation(format!(
                        "scene {} has no clip to compose",
                        scene.scene_number
                    )))
                }
            }
        }
        let concatenated = self.composer.concat_clips(&clip_urls).await?;

        let entries: Vec<(i32, Option<&str>)> = ordered
            .iter()
            .map(|s| (s.scene_number, s.voiceover_url.as_deref()))
            .collect();
        let voiceovers = voiceover_tracks(&entries);
        let music_overlay = music
            .and_then(|m| m.processed_music_url.as_deref())
            .map(music_track);

        Ok(self
            .composer
            .overlay_audio(&concatenated, &voiceovers, music_overlay.as_ref())
            .await?)
    }

    /// Burn captions into a composed video, producing the final artifact.
    pub async fn caption(&self, video_url: &str) -> Result<String, PipelineError> {
        Ok(self.composer.add_captions(video_url).await?)
    }
}
