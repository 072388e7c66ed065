//! The seven-stage generation pipeline.
//!
//! Each stage persists its status *before* doing the stage's work, so the
//! row always names the last attempted stage: a run that dies during clip
//! synthesis leaves `generating_scenes` on record, not the stage before
//! it. A retried run starts over from stage 1; there is no checkpoint
//! resumption.

use std::sync::Arc;

use futures::future::join_all;

use reelgen_core::script::validate_script;
use reelgen_core::types::DbId;
use reelgen_db::models::scene::Scene;
use reelgen_db::models::status::VideoStatus;
use reelgen_db::models::video::Video;
use reelgen_db::VideoStore;
use reelgen_events::{CompletionNotice, Notifier};
use reelgen_providers::ScriptGenerator;

use crate::config::{PipelineConfig, VoiceoverFailurePolicy};
use crate::error::PipelineError;
use crate::stages::StageRunner;

/// Drives a video from `pending` to `completed`.
pub struct GenerationPipeline {
    store: Arc<dyn VideoStore>,
    scripts: Arc<dyn ScriptGenerator>,
    runner: Arc<StageRunner>,
    notifier: Arc<dyn Notifier>,
    config: PipelineConfig,
}

impl GenerationPipeline {
    pub fn new(
        store: Arc<dyn VideoStore>,
        scripts: Arc<dyn ScriptGenerator>,
        runner: Arc<StageRunner>,
        notifier: Arc<dyn Notifier>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            store,
            scripts,
            runner,
            notifier,
            config,
        }
    }

    /// Run the full pipeline for `video_id`.
    ///
    /// On failure the video is marked `failed` with the error text before
    /// the error propagates to the scheduler. The completion callback is
    /// sent from here; the failure callback is the scheduler's to send
    /// once retries are exhausted.
    pub async fn run(&self, video_id: DbId) -> Result<(), PipelineError> {
        let video = self.store.get_video(video_id).await?;

        match video.status {
            // Re-delivered task for a finished run.
            VideoStatus::Completed => {
                tracing::info!(video_id = %video_id, "Video already completed, skipping run");
                return Ok(());
            }
            VideoStatus::RevisionRequested | VideoStatus::ProcessingRevision => {
                return Err(PipelineError::State(format!(
                    "video {video_id} has a revision in flight, refusing to regenerate"
                )));
            }
            _ => {}
        }

        tracing::info!(video_id = %video_id, "Starting video generation");

        match self.execute(&video).await {
            Ok(final_url) => {
                tracing::info!(video_id = %video_id, final_url = %final_url, "Video generation completed");
                self.notify_completion(&video, &final_url).await;
                Ok(())
            }
            Err(e) => {
                tracing::error!(video_id = %video_id, error = %e, "Video generation failed");
                if let Err(store_err) = self.store.set_failed(video_id, &e.to_string()).await {
                    tracing::error!(video_id = %video_id, error = %store_err, "Failed to record failure status");
                }
                Err(e)
            }
        }
    }

    async fn execute(&self, video: &Video) -> Result<String, PipelineError> {
        let prompt = video.prompt.as_deref().ok_or_else(|| {
            PipelineError::Validation(format!("video {} has no prompt", video.id))
        })?;
        let source_image = video.image_url.as_deref().ok_or_else(|| {
            PipelineError::Validation(format!("video {} has no source image", video.id))
        })?;

        // Stage 1: script.
        self.store
            .set_status(video.id, VideoStatus::ProcessingScript)
            .await?;
        let script = self.scripts.generate_script(prompt).await?;
        validate_script(&script.scenes).map_err(|e| PipelineError::Validation(e.to_string()))?;
        let scenes = self.store.replace_scenes(video.id, &script.scenes).await?;

        // Stage 2: base image.
        self.store
            .set_status(video.id, VideoStatus::ProcessingImages)
            .await?;
        let base_image = self.runner.reframe_base_image(source_image).await?;

        // Stage 3: scene clips, all five concurrently, all-or-nothing.
        self.store
            .set_status(video.id, VideoStatus::GeneratingScenes)
            .await?;
        let scenes = self.materialize_scenes(&base_image, &scenes).await?;

        // Stage 4: voiceovers, all five concurrently, degradable.
        self.store
            .set_status(video.id, VideoStatus::GeneratingVoiceovers)
            .await?;
        let scenes = self.synthesize_voiceovers(&scenes).await?;

        // Stage 5: music.
        self.store
            .set_status(video.id, VideoStatus::GeneratingMusic)
            .await?;
        let music = self.runner.generate_music(video.id, &scenes).await?;

        // Stage 6: composition.
        self.store
            .set_status(video.id, VideoStatus::ComposingVideo)
            .await?;
        let composed = self.runner.compose(&scenes, Some(&music)).await?;

        // Stage 7: captions.
        self.store
            .set_status(video.id, VideoStatus::AddingCaptions)
            .await?;
        let final_url = self.runner.caption(&composed).await?;

        self.store.set_completed(video.id, &final_url).await?;
        Ok(final_url)
    }

    /// Fan out scene materialization and collect every outcome before
    /// failing, so the successful scenes' artifacts are persisted even
    /// when a sibling fails. The first failure then fails the run.
    async fn materialize_scenes(
        &self,
        base_image: &str,
        scenes: &[Scene],
    ) -> Result<Vec<Scene>, PipelineError> {
        let outcomes = join_all(
            scenes
                .iter()
                .map(|scene| self.runner.materialize_scene(base_image, scene)),
        )
        .await;

        let mut updated = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            updated.push(outcome?);
        }
        Ok(updated)
    }

    /// Fan out narration synthesis, then apply the configured policy to
    /// the per-scene outcomes.
    async fn synthesize_voiceovers(&self, scenes: &[Scene]) -> Result<Vec<Scene>, PipelineError> {
        let outcomes = join_all(
            scenes
                .iter()
                .map(|scene| self.runner.synthesize_voiceover(scene)),
        )
        .await;

        let mut updated = Vec::with_capacity(outcomes.len());
        for (scene, outcome) in scenes.iter().zip(outcomes) {
            match outcome {
                Ok(refreshed) => updated.push(refreshed),
                Err(e) => match self.config.voiceover_failure_policy {
                    VoiceoverFailurePolicy::AllowPartial => {
                        tracing::warn!(
                            scene_number = scene.scene_number,
                            error = %e,
                            "Voiceover synthesis failed, scene will play without narration"
                        );
                        updated.push(self.runner.clear_voiceover(scene).await?);
                    }
                    VoiceoverFailurePolicy::FailFast => return Err(e),
                },
            }
        }
        Ok(updated)
    }

    /// Completion callbacks are best-effort: a delivery failure never
    /// fails a run that already produced its artifact.
    async fn notify_completion(&self, video: &Video, final_url: &str) {
        let notice = CompletionNotice {
            video_id: video.id,
            chat_id: video.chat_id.clone().unwrap_or_default(),
            user_id: video.user_id.clone(),
            video_url: final_url.to_string(),
            is_revision: false,
        };
        if let Err(e) = self.notifier.notify_completion(&notice).await {
            tracing::warn!(video_id = %video.id, error = %e, "Completion callback failed");
        }
    }
}
