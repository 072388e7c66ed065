//! In-memory fakes for the store, the capability ports, and the notifier,
//! plus a harness that wires them into pipelines the way production does.
//!
//! Fakes return deterministic URLs that encode their inputs (for example
//! `enhanced://visual 3`, `speech://voiceover 2`) so tests can assert
//! exactly which artifacts a run produced or reused.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use reelgen_core::revision::SceneChange;
use reelgen_core::script::{SceneSnapshot, ScriptScene, VideoScript};
use reelgen_core::timeline::AudioTrack;
use reelgen_core::types::DbId;
use reelgen_db::models::music::{Music, UpsertMusic};
use reelgen_db::models::revision::Revision;
use reelgen_db::models::scene::{Scene, UpdateScene};
use reelgen_db::models::status::{RevisionStatus, VideoStatus};
use reelgen_db::models::video::Video;
use reelgen_db::{StoreError, VideoStore};
use reelgen_events::{CompletionNotice, FailureNotice, Notifier, NotifyError};
use reelgen_pipeline::{GenerationPipeline, PipelineConfig, RevisionPipeline, StageRunner};
use reelgen_providers::{
    ClipGenerator, ImageEditor, MusicGenerator, ProviderError, RevisionAnalyzer, ScriptGenerator,
    SpeechSynthesizer, VideoComposer,
};

/// The error every rigged fake raises.
fn injected_failure() -> ProviderError {
    ProviderError::JobFailed {
        request_id: "fake".to_string(),
        detail: "injected failure".to_string(),
    }
}

/// Build a five-scene script whose text fields encode their scene number.
pub fn five_scene_script() -> VideoScript {
    VideoScript {
        scenes: (1..=5)
            .map(|n| ScriptScene {
                scene_number: n,
                visual_description: format!("visual {n}"),
                voiceover: format!("voiceover {n}"),
                shot_type: Some(String::new()),
                sound_effects: Some(format!("soft chimes {n}")),
                music_direction: Some(format!("uplifting strings {n}")),
            })
            .collect(),
    }
}

/// Build a bare scene row carrying a clip reference, for composition
/// tests that bypass the earlier stages.
pub fn clip_scene(video_id: DbId, scene_number: i32, clip_url: Option<String>) -> Scene {
    Scene {
        id: Uuid::new_v4(),
        video_id,
        scene_number,
        visual_description: Some(format!("visual {scene_number}")),
        voiceover: Some(format!("voiceover {scene_number}")),
        sound_effects: None,
        music_direction: None,
        shot_type: None,
        image_url: None,
        scene_clip_url: clip_url,
        voiceover_url: Some(format!("speech://voiceover {scene_number}")),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Build an extracted change for a scene.
pub fn change(scene_number: i32, fields: &[(&str, &str)]) -> SceneChange {
    SceneChange {
        scene_number,
        changed: fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Store fake
// ---------------------------------------------------------------------------

/// In-memory [`VideoStore`] that also records every status write, so
/// tests can assert the exact checkpoint sequence a run produced.
#[derive(Default)]
pub struct FakeStore {
    pub videos: Mutex<HashMap<DbId, Video>>,
    pub scenes: Mutex<HashMap<DbId, Scene>>,
    pub music: Mutex<HashMap<DbId, Music>>,
    pub revisions: Mutex<HashMap<DbId, Revision>>,
    pub status_history: Mutex<Vec<VideoStatus>>,
}

impl FakeStore {
    pub fn video(&self, id: DbId) -> Video {
        self.videos.lock().unwrap()[&id].clone()
    }

    pub fn scenes_of(&self, video_id: DbId) -> Vec<Scene> {
        let mut rows: Vec<Scene> = self
            .scenes
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.video_id == video_id)
            .cloned()
            .collect();
        rows.sort_by_key(|s| s.scene_number);
        rows
    }

    pub fn scene(&self, video_id: DbId, scene_number: i32) -> Scene {
        self.scenes_of(video_id)
            .into_iter()
            .find(|s| s.scene_number == scene_number)
            .expect("scene not seeded")
    }

    pub fn music_of(&self, video_id: DbId) -> Option<Music> {
        self.music.lock().unwrap().get(&video_id).cloned()
    }

    pub fn revision_row(&self, id: DbId) -> Revision {
        self.revisions.lock().unwrap()[&id].clone()
    }

    pub fn history(&self) -> Vec<VideoStatus> {
        self.status_history.lock().unwrap().clone()
    }
}

#[async_trait]
impl VideoStore for FakeStore {
    async fn get_video(&self, id: DbId) -> Result<Video, StoreError> {
        self.videos
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound { entity: "video", id })
    }

    async fn set_status(&self, id: DbId, status: VideoStatus) -> Result<(), StoreError> {
        if let Some(video) = self.videos.lock().unwrap().get_mut(&id) {
            video.status = status;
            video.updated_at = Utc::now();
            self.status_history.lock().unwrap().push(status);
        }
        Ok(())
    }

    async fn set_completed(&self, id: DbId, final_video_url: &str) -> Result<(), StoreError> {
        if let Some(video) = self.videos.lock().unwrap().get_mut(&id) {
            video.status = VideoStatus::Completed;
            video.final_video_url = Some(final_video_url.to_string());
            video.error_message = None;
            video.updated_at = Utc::now();
            self.status_history
                .lock()
                .unwrap()
                .push(VideoStatus::Completed);
        }
        Ok(())
    }

    async fn set_failed(&self, id: DbId, error: &str) -> Result<(), StoreError> {
        if let Some(video) = self.videos.lock().unwrap().get_mut(&id) {
            video.status = VideoStatus::Failed;
            video.error_message = Some(error.to_string());
            video.updated_at = Utc::now();
            self.status_history
                .lock()
                .unwrap()
                .push(VideoStatus::Failed);
        }
        Ok(())
    }

    async fn replace_scenes(
        &self,
        video_id: DbId,
        script_scenes: &[ScriptScene],
    ) -> Result<Vec<Scene>, StoreError> {
        let mut table = self.scenes.lock().unwrap();
        table.retain(|_, s| s.video_id != video_id);
        let mut rows: Vec<Scene> = script_scenes
            .iter()
            .map(|s| Scene {
                id: Uuid::new_v4(),
                video_id,
                scene_number: s.scene_number,
                visual_description: Some(s.visual_description.clone()),
                voiceover: Some(s.voiceover.clone()),
                sound_effects: s.sound_effects.clone(),
                music_direction: s.music_direction.clone(),
                shot_type: s.shot_type.clone(),
                image_url: None,
                scene_clip_url: None,
                voiceover_url: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
            .collect();
        for row in &rows {
            table.insert(row.id, row.clone());
        }
        rows.sort_by_key(|s| s.scene_number);
        Ok(rows)
    }

    async fn list_scenes(&self, video_id: DbId) -> Result<Vec<Scene>, StoreError> {
        Ok(self.scenes_of(video_id))
    }

    async fn update_scene(
        &self,
        scene_id: DbId,
        changes: &UpdateScene,
    ) -> Result<Scene, StoreError> {
        let mut table = self.scenes.lock().unwrap();
        let scene = table.get_mut(&scene_id).ok_or(StoreError::NotFound {
            entity: "scene",
            id: scene_id,
        })?;
        if let Some(v) = &changes.visual_description {
            scene.visual_description = Some(v.clone());
        }
        if let Some(v) = &changes.voiceover {
            scene.voiceover = Some(v.clone());
        }
        if let Some(v) = &changes.sound_effects {
            scene.sound_effects = Some(v.clone());
        }
        if let Some(v) = &changes.music_direction {
            scene.music_direction = Some(v.clone());
        }
        if let Some(v) = &changes.shot_type {
            scene.shot_type = Some(v.clone());
        }
        if let Some(v) = &changes.image_url {
            scene.image_url = Some(v.clone());
        }
        if let Some(v) = &changes.scene_clip_url {
            scene.scene_clip_url = Some(v.clone());
        }
        if let Some(v) = &changes.voiceover_url {
            scene.voiceover_url = Some(v.clone());
        }
        scene.updated_at = Utc::now();
        Ok(scene.clone())
    }

    async fn upsert_music(&self, video_id: DbId, music: &UpsertMusic) -> Result<Music, StoreError> {
        let mut table = self.music.lock().unwrap();
        let id = table
            .get(&video_id)
            .map(|m| m.id)
            .unwrap_or_else(Uuid::new_v4);
        let row = Music {
            id,
            video_id,
            music_prompt: Some(music.music_prompt.clone()),
            music_url: Some(music.music_url.clone()),
            processed_music_url: Some(music.processed_music_url.clone()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        table.insert(video_id, row.clone());
        Ok(row)
    }

    async fn get_music(&self, video_id: DbId) -> Result<Option<Music>, StoreError> {
        Ok(self.music.lock().unwrap().get(&video_id).cloned())
    }

    async fn get_revision(&self, id: DbId) -> Result<Revision, StoreError> {
        self.revisions
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound {
                entity: "revision",
                id,
            })
    }

    async fn complete_revision(&self, id: DbId, result_video_url: &str) -> Result<(), StoreError> {
        if let Some(revision) = self.revisions.lock().unwrap().get_mut(&id) {
            revision.status = RevisionStatus::Completed;
            revision.result_video_url = Some(result_video_url.to_string());
            revision.error_message = None;
            revision.completed_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn fail_revision(&self, id: DbId, error: &str) -> Result<(), StoreError> {
        if let Some(revision) = self.revisions.lock().unwrap().get_mut(&id) {
            revision.status = RevisionStatus::Failed;
            revision.error_message = Some(error.to_string());
            revision.completed_at = Some(Utc::now());
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Capability fakes
// ---------------------------------------------------------------------------

pub struct FakeScripts {
    script: Mutex<VideoScript>,
    pub fail: AtomicBool,
    pub calls: Mutex<Vec<String>>,
}

impl Default for FakeScripts {
    fn default() -> Self {
        Self {
            script: Mutex::new(five_scene_script()),
            fail: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl FakeScripts {
    pub fn set_script(&self, script: VideoScript) {
        *self.script.lock().unwrap() = script;
    }
}

#[async_trait]
impl ScriptGenerator for FakeScripts {
    async fn generate_script(&self, user_prompt: &str) -> Result<VideoScript, ProviderError> {
        self.calls.lock().unwrap().push(user_prompt.to_string());
        if self.fail.load(Ordering::SeqCst) {
            return Err(injected_failure());
        }
        Ok(self.script.lock().unwrap().clone())
    }
}

#[derive(Default)]
pub struct FakeImages {
    pub fail_reframe: AtomicBool,
    pub fail_enhance: AtomicBool,
    pub reframe_calls: Mutex<Vec<String>>,
    pub enhance_calls: Mutex<Vec<String>>,
}

#[async_trait]
impl ImageEditor for FakeImages {
    async fn reframe(&self, image_url: &str) -> Result<String, ProviderError> {
        self.reframe_calls.lock().unwrap().push(image_url.to_string());
        if self.fail_reframe.load(Ordering::SeqCst) {
            return Err(injected_failure());
        }
        Ok(format!("{image_url}?reframed"))
    }

    async fn enhance(
        &self,
        _image_url: &str,
        visual_description: &str,
    ) -> Result<String, ProviderError> {
        self.enhance_calls
            .lock()
            .unwrap()
            .push(visual_description.to_string());
        if self.fail_enhance.load(Ordering::SeqCst) {
            return Err(injected_failure());
        }
        Ok(format!("enhanced://{visual_description}"))
    }
}

#[derive(Default)]
pub struct FakeClips {
    pub fail: AtomicBool,
    pub calls: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl ClipGenerator for FakeClips {
    async fn generate_clip(&self, image_url: &str, prompt: &str) -> Result<String, ProviderError> {
        let mut calls = self.calls.lock().unwrap();
        calls.push((image_url.to_string(), prompt.to_string()));
        if self.fail.load(Ordering::SeqCst) {
            return Err(injected_failure());
        }
        Ok(format!("clip://{}", calls.len()))
    }
}

#[derive(Default)]
pub struct FakeSpeech {
    pub fail_all: AtomicBool,
    fail_matching: Mutex<Option<String>>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeSpeech {
    /// Fail synthesis for any text containing `needle`.
    pub fn fail_texts_containing(&self, needle: &str) {
        *self.fail_matching.lock().unwrap() = Some(needle.to_string());
    }
}

#[async_trait]
impl SpeechSynthesizer for FakeSpeech {
    async fn synthesize(&self, text: &str) -> Result<String, ProviderError> {
        self.calls.lock().unwrap().push(text.to_string());
        if self.fail_all.load(Ordering::SeqCst) {
            return Err(injected_failure());
        }
        if let Some(needle) = self.fail_matching.lock().unwrap().as_deref() {
            if text.contains(needle) {
                return Err(injected_failure());
            }
        }
        Ok(format!("speech://{text}"))
    }
}

#[derive(Default)]
pub struct FakeMusic {
    pub fail: AtomicBool,
    pub calls: Mutex<Vec<String>>,
}

#[async_trait]
impl MusicGenerator for FakeMusic {
    async fn generate_music(&self, prompt: &str) -> Result<String, ProviderError> {
        let mut calls = self.calls.lock().unwrap();
        calls.push(prompt.to_string());
        if self.fail.load(Ordering::SeqCst) {
            return Err(injected_failure());
        }
        Ok(format!("music://{}", calls.len()))
    }
}

#[derive(Default)]
pub struct FakeComposer {
    pub fail_concat: AtomicBool,
    pub concat_calls: Mutex<Vec<Vec<String>>>,
    pub overlay_calls: Mutex<Vec<(String, Vec<AudioTrack>, Option<AudioTrack>)>>,
    pub normalize_calls: Mutex<Vec<String>>,
    pub caption_calls: Mutex<Vec<String>>,
}

#[async_trait]
impl VideoComposer for FakeComposer {
    async fn concat_clips(&self, clip_urls: &[String]) -> Result<String, ProviderError> {
        let mut calls = self.concat_calls.lock().unwrap();
        calls.push(clip_urls.to_vec());
        if self.fail_concat.load(Ordering::SeqCst) {
            return Err(injected_failure());
        }
        Ok(format!("composed://{}", calls.len()))
    }

    async fn overlay_audio(
        &self,
        video_url: &str,
        voiceovers: &[AudioTrack],
        music: Option<&AudioTrack>,
    ) -> Result<String, ProviderError> {
        let mut calls = self.overlay_calls.lock().unwrap();
        calls.push((video_url.to_string(), voiceovers.to_vec(), music.cloned()));
        Ok(format!("overlaid://{}", calls.len()))
    }

    async fn normalize_loudness(&self, audio_url: &str) -> Result<String, ProviderError> {
        self.normalize_calls
            .lock()
            .unwrap()
            .push(audio_url.to_string());
        Ok(format!("{audio_url}?normalized"))
    }

    async fn add_captions(&self, video_url: &str) -> Result<String, ProviderError> {
        let mut calls = self.caption_calls.lock().unwrap();
        calls.push(video_url.to_string());
        Ok(format!("captioned://{}", calls.len()))
    }
}

#[derive(Default)]
pub struct FakeAnalyzer {
    changes: Mutex<Vec<SceneChange>>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeAnalyzer {
    pub fn set_changes(&self, changes: Vec<SceneChange>) {
        *self.changes.lock().unwrap() = changes;
    }
}

#[async_trait]
impl RevisionAnalyzer for FakeAnalyzer {
    async fn analyze(
        &self,
        request: &str,
        _scenes: &[SceneSnapshot],
        _video_id: DbId,
    ) -> Result<Vec<SceneChange>, ProviderError> {
        self.calls.lock().unwrap().push(request.to_string());
        Ok(self.changes.lock().unwrap().clone())
    }
}

#[derive(Default)]
pub struct FakeNotifier {
    pub completions: Mutex<Vec<CompletionNotice>>,
    pub failures: Mutex<Vec<FailureNotice>>,
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn notify_completion(&self, notice: &CompletionNotice) -> Result<(), NotifyError> {
        self.completions.lock().unwrap().push(notice.clone());
        Ok(())
    }

    async fn notify_failure(&self, notice: &FailureNotice) -> Result<(), NotifyError> {
        self.failures.lock().unwrap().push(notice.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

/// All fakes wired together, with pipeline constructors matching how the
/// worker binary builds the real thing.
pub struct Harness {
    pub store: Arc<FakeStore>,
    pub scripts: Arc<FakeScripts>,
    pub images: Arc<FakeImages>,
    pub clips: Arc<FakeClips>,
    pub speech: Arc<FakeSpeech>,
    pub music: Arc<FakeMusic>,
    pub composer: Arc<FakeComposer>,
    pub analyzer: Arc<FakeAnalyzer>,
    pub notifier: Arc<FakeNotifier>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            store: Arc::new(FakeStore::default()),
            scripts: Arc::new(FakeScripts::default()),
            images: Arc::new(FakeImages::default()),
            clips: Arc::new(FakeClips::default()),
            speech: Arc::new(FakeSpeech::default()),
            music: Arc::new(FakeMusic::default()),
            composer: Arc::new(FakeComposer::default()),
            analyzer: Arc::new(FakeAnalyzer::default()),
            notifier: Arc::new(FakeNotifier::default()),
        }
    }

    pub fn runner(&self) -> Arc<StageRunner> {
        Arc::new(StageRunner::new(
            self.store.clone(),
            self.images.clone(),
            self.clips.clone(),
            self.speech.clone(),
            self.music.clone(),
            self.composer.clone(),
        ))
    }

    pub fn generation(&self) -> GenerationPipeline {
        self.generation_with(PipelineConfig::default())
    }

    pub fn generation_with(&self, config: PipelineConfig) -> GenerationPipeline {
        GenerationPipeline::new(
            self.store.clone(),
            self.scripts.clone(),
            self.runner(),
            self.notifier.clone(),
            config,
        )
    }

    pub fn revision(&self) -> RevisionPipeline {
        RevisionPipeline::new(
            self.store.clone(),
            self.analyzer.clone(),
            self.runner(),
            self.notifier.clone(),
        )
    }

    /// Insert a video with the given status.
    pub fn seed_video(&self, status: VideoStatus) -> Video {
        let video = Video {
            id: Uuid::new_v4(),
            user_id: "user-1".to_string(),
            chat_id: Some("chat-1".to_string()),
            prompt: Some("A 30 second ad for a smart bottle".to_string()),
            image_url: Some("https://cdn.example/source.png".to_string()),
            status,
            final_video_url: None,
            error_message: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.store
            .videos
            .lock()
            .unwrap()
            .insert(video.id, video.clone());
        video
    }

    /// Seed everything a revision needs: a video that finished generation
    /// (five scenes with artifacts, a normalized music record, a final
    /// artifact) now flipped to `revision_requested`, plus a pending
    /// revision row for `request`.
    pub fn seed_revision(&self, request: &str) -> (Video, Revision) {
        let mut video = self.seed_video(VideoStatus::RevisionRequested);
        video.final_video_url = Some("captioned://seed".to_string());
        self.store
            .videos
            .lock()
            .unwrap()
            .insert(video.id, video.clone());

        let mut scenes = self.store.scenes.lock().unwrap();
        for n in 1..=5 {
            let scene = Scene {
                id: Uuid::new_v4(),
                video_id: video.id,
                scene_number: n,
                visual_description: Some(format!("visual {n}")),
                voiceover: Some(format!("voiceover {n}")),
                sound_effects: Some(format!("soft chimes {n}")),
                music_direction: Some(format!("uplifting strings {n}")),
                shot_type: Some(String::new()),
                image_url: Some(format!("enhanced://visual {n}")),
                scene_clip_url: Some(format!("clip://seed-{n}")),
                voiceover_url: Some(format!("speech://voiceover {n}")),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            };
            scenes.insert(scene.id, scene);
        }
        drop(scenes);

        let music = Music {
            id: Uuid::new_v4(),
            video_id: video.id,
            music_prompt: Some("seed prompt".to_string()),
            music_url: Some("music://seed".to_string()),
            processed_music_url: Some("music://seed?normalized".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.store.music.lock().unwrap().insert(video.id, music);

        let revision = Revision {
            id: Uuid::new_v4(),
            video_id: video.id,
            revision_request: request.to_string(),
            revision_type: "general".to_string(),
            status: RevisionStatus::Pending,
            result_video_url: None,
            target_scene_number: None,
            error_message: None,
            created_at: Utc::now(),
            completed_at: None,
        };
        self.store
            .revisions
            .lock()
            .unwrap()
            .insert(revision.id, revision.clone());

        (video, revision)
    }
}
