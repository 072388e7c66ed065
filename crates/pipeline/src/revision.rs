//! Selective regeneration of a completed video.
//!
//! A revision extracts structured changes from a free-text request,
//! applies them to the scene records, regenerates only the artifacts
//! those changes invalidate, then unconditionally recomposes and
//! recaptions. The parent video keeps its own final artifact; the
//! revision record carries the new one.

use std::sync::Arc;

use reelgen_core::revision::{classify_changes, SceneChange, SceneField};
use reelgen_core::script::{is_valid_scene_number, SceneSnapshot};
use reelgen_core::types::DbId;
use reelgen_db::models::revision::Revision;
use reelgen_db::models::scene::{Scene, UpdateScene};
use reelgen_db::models::status::{RevisionStatus, VideoStatus};
use reelgen_db::models::video::Video;
use reelgen_db::VideoStore;
use reelgen_events::{CompletionNotice, Notifier};
use reelgen_providers::RevisionAnalyzer;

use crate::error::PipelineError;
use crate::stages::StageRunner;

/// Drives a revision from `pending` to `completed`, restoring the parent
/// video to `completed` whichever way the run ends.
pub struct RevisionPipeline {
    store: Arc<dyn VideoStore>,
    analyzer: Arc<dyn RevisionAnalyzer>,
    runner: Arc<StageRunner>,
    notifier: Arc<dyn Notifier>,
}

impl RevisionPipeline {
    pub fn new(
        store: Arc<dyn VideoStore>,
        analyzer: Arc<dyn RevisionAnalyzer>,
        runner: Arc<StageRunner>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            analyzer,
            runner,
            notifier,
        }
    }

    /// Run revision `revision_id` against `video_id`.
    ///
    /// `new_video_id` identifies the regenerated artifact in the
    /// completion callback; the parent video keeps its own identifier.
    pub async fn run(
        &self,
        video_id: DbId,
        revision_id: DbId,
        new_video_id: DbId,
    ) -> Result<(), PipelineError> {
        let video = self.store.get_video(video_id).await?;
        let revision = self.store.get_revision(revision_id).await?;

        // Re-delivered task for a finished run.
        if revision.status == RevisionStatus::Completed {
            tracing::info!(revision_id = %revision_id, "Revision already completed, skipping run");
            return Ok(());
        }

        match video.status {
            VideoStatus::RevisionRequested | VideoStatus::ProcessingRevision => {}
            // A failed attempt restores the parent to `completed` while
            // the scheduler may still owe the task a retry, so a
            // completed parent with an unfinished revision is runnable.
            VideoStatus::Completed => {}
            other => {
                return Err(PipelineError::State(format!(
                    "video {video_id} is {other}, revisions run only against completed videos"
                )));
            }
        }

        tracing::info!(video_id = %video_id, revision_id = %revision_id, "Starting revision");
        self.store
            .set_status(video_id, VideoStatus::ProcessingRevision)
            .await?;

        match self.execute(&video, &revision).await {
            Ok(result_url) => {
                self.store.complete_revision(revision_id, &result_url).await?;
                self.store
                    .set_status(video_id, VideoStatus::Completed)
                    .await?;
                tracing::info!(
                    video_id = %video_id,
                    revision_id = %revision_id,
                    result_url = %result_url,
                    "Revision completed"
                );
                self.notify_completion(&video, new_video_id, &result_url)
                    .await;
                Ok(())
            }
            Err(e) => {
                tracing::error!(video_id = %video_id, revision_id = %revision_id, error = %e, "Revision failed");
                // The parent's artifact is intact; it goes back to
                // `completed` and stays eligible for future revisions.
                if let Err(store_err) = self.store.fail_revision(revision_id, &e.to_string()).await
                {
                    tracing::error!(revision_id = %revision_id, error = %store_err, "Failed to record revision failure");
                }
                if let Err(store_err) = self
                    .store
                    .set_status(video_id, VideoStatus::Completed)
                    .await
                {
                    tracing::error!(video_id = %video_id, error = %store_err, "Failed to restore video status");
                }
                Err(e)
            }
        }
    }

    async fn execute(&self, video: &Video, revision: &Revision) -> Result<String, PipelineError> {
        let mut scenes = self.store.list_scenes(video.id).await?;
        if scenes.is_empty() {
            return Err(PipelineError::Validation(format!(
                "video {} has no scenes to revise",
                video.id
            )));
        }

        let snapshots: Vec<SceneSnapshot> = scenes.iter().map(Scene::snapshot).collect();
        let changes = self
            .analyzer
            .analyze(&revision.revision_request, &snapshots, video.id)
            .await?;
        tracing::info!(
            video_id = %video.id,
            changed_scenes = changes.len(),
            "Extracted revision changes"
        );

        let plan = classify_changes(&changes);
        for scene_number in &plan.skipped_scenes {
            tracing::warn!(
                scene_number,
                "Extracted change targets a scene outside 1..=5, skipping"
            );
        }
        for (scene_number, field) in &plan.skipped_fields {
            tracing::warn!(
                scene_number,
                field = %field,
                "Extracted change names an unknown field, skipping"
            );
        }

        self.apply_changes(&mut scenes, &changes).await?;

        for &scene_number in &plan.clip_scenes {
            self.regenerate_clip(video, &mut scenes, scene_number)
                .await?;
        }
        for &scene_number in &plan.voiceover_scenes {
            self.regenerate_voiceover(&mut scenes, scene_number).await?;
        }

        let music = if plan.regenerate_music {
            Some(self.runner.generate_music(video.id, &scenes).await?)
        } else {
            self.store.get_music(video.id).await?
        };

        // Recompose and recaption regardless of what was regenerated.
        let composed = self.runner.compose(&scenes, music.as_ref()).await?;
        self.runner.caption(&composed).await
    }

    /// Write the extracted field values to their scene rows.
    async fn apply_changes(
        &self,
        scenes: &mut [Scene],
        changes: &[SceneChange],
    ) -> Result<(), PipelineError> {
        for change in changes {
            let Some(position) = scenes
                .iter()
                .position(|s| s.scene_number == change.scene_number)
            else {
                // Out-of-range numbers were already logged from the plan.
                if is_valid_scene_number(change.scene_number) {
                    tracing::warn!(
                        scene_number = change.scene_number,
                        "Change targets a scene this video does not have, skipping"
                    );
                }
                continue;
            };

            let mut update = UpdateScene::default();
            let mut touched = false;
            for (field, value) in change.known_changes() {
                touched = true;
                let value = Some(value.to_string());
                match field {
                    SceneField::VisualDescription => update.visual_description = value,
                    SceneField::Voiceover => update.voiceover = value,
                    SceneField::SoundEffects => update.sound_effects = value,
                    SceneField::MusicDirection => update.music_direction = value,
                    SceneField::ShotType => update.shot_type = value,
                }
            }
            if touched {
                scenes[position] = self
                    .store
                    .update_scene(scenes[position].id, &update)
                    .await?;
            }
        }
        Ok(())
    }

    /// Re-synthesize one scene's clip from its stored enhanced image,
    /// falling back to the video's source image.
    async fn regenerate_clip(
        &self,
        video: &Video,
        scenes: &mut [Scene],
        scene_number: i32,
    ) -> Result<(), PipelineError> {
        let position = scenes
            .iter()
            .position(|s| s.scene_number == scene_number)
            .ok_or_else(|| {
                PipelineError::Validation(format!(
                    "scene {scene_number} not found for clip regeneration"
                ))
            })?;
        let scene = scenes[position].clone();
        let image_url = scene
            .image_url
            .clone()
            .filter(|url| !url.is_empty())
            .or_else(|| video.image_url.clone())
            .ok_or_else(|| {
                PipelineError::Validation(format!(
                    "scene {scene_number} has no image for clip regeneration"
                ))
            })?;

        tracing::info!(scene_number, "Regenerating scene clip");
        scenes[position] = self.runner.synthesize_scene_clip(&image_url, &scene).await?;
        Ok(())
    }

    /// Re-synthesize one scene's narration. Unlike initial generation,
    /// a failure here fails the revision: the user explicitly asked for
    /// this narration.
    async fn regenerate_voiceover(
        &self,
        scenes: &mut [Scene],
        scene_number: i32,
    ) -> Result<(), PipelineError> {
        let position = scenes
            .iter()
            .position(|s| s.scene_number == scene_number)
            .ok_or_else(|| {
                PipelineError::Validation(format!(
                    "scene {scene_number} not found for voiceover regeneration"
                ))
            })?;
        let scene = scenes[position].clone();

        tracing::info!(scene_number, "Regenerating voiceover");
        scenes[position] = self.runner.synthesize_voiceover(&scene).await?;
        Ok(())
    }

    async fn notify_completion(&self, video: &Video, new_video_id: DbId, result_url: &str) {
        let notice = CompletionNotice {
            video_id: new_video_id,
            chat_id: video.chat_id.clone().unwrap_or_default(),
            user_id: video.user_id.clone(),
            video_url: result_url.to_string(),
            is_revision: true,
        };
        if let Err(e) = self.notifier.notify_completion(&notice).await {
            tracing::warn!(video_id = %video.id, error = %e, "Revision completion callback failed");
        }
    }
}
