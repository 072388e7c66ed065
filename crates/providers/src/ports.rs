//! Capability traits consumed by the pipelines.
//!
//! Each trait covers one external capability. Production wires the fal.ai
//! and OpenAI implementations from this crate; tests wire fakes. All
//! methods return artifact URLs rather than bytes, matching how the
//! downstream services exchange media.

use async_trait::async_trait;

use reelgen_core::revision::SceneChange;
use reelgen_core::script::{SceneSnapshot, VideoScript};
use reelgen_core::timeline::AudioTrack;
use reelgen_core::types::DbId;

use crate::error::ProviderError;

/// Turns a user prompt into a structured five-scene script.
#[async_trait]
pub trait ScriptGenerator: Send + Sync {
    /// Generate and validate a script for `user_prompt`.
    async fn generate_script(&self, user_prompt: &str) -> Result<VideoScript, ProviderError>;
}

/// Prepares still images for clip synthesis.
#[async_trait]
pub trait ImageEditor: Send + Sync {
    /// Reframe an image to the vertical 9:16 aspect ratio, extending the
    /// background rather than stretching the subject.
    async fn reframe(&self, image_url: &str) -> Result<String, ProviderError>;

    /// Restyle an image to match a scene's visual description.
    async fn enhance(
        &self,
        image_url: &str,
        visual_description: &str,
    ) -> Result<String, ProviderError>;
}

/// Synthesizes a short video clip from a still image and a prompt.
#[async_trait]
pub trait ClipGenerator: Send + Sync {
    /// Generate one scene clip. The prompt must already be sanitized for
    /// transport (see [`reelgen_core::prompt::clip_prompt`]).
    async fn generate_clip(&self, image_url: &str, prompt: &str) -> Result<String, ProviderError>;
}

/// Synthesizes narration audio from text.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize one voiceover, returning the audio URL.
    async fn synthesize(&self, text: &str) -> Result<String, ProviderError>;
}

/// Synthesizes background music from a combined direction prompt.
#[async_trait]
pub trait MusicGenerator: Send + Sync {
    /// Generate an instrumental track, returning the audio URL.
    async fn generate_music(&self, prompt: &str) -> Result<String, ProviderError>;
}

/// Assembles the final video from clips, audio tracks, and captions.
#[async_trait]
pub trait VideoComposer: Send + Sync {
    /// Concatenate scene clips into one continuous video.
    async fn concat_clips(&self, clip_urls: &[String]) -> Result<String, ProviderError>;

    /// Lay voiceover and music tracks over a video, muting its own audio.
    async fn overlay_audio(
        &self,
        video_url: &str,
        voiceovers: &[AudioTrack],
        music: Option<&AudioTrack>,
    ) -> Result<String, ProviderError>;

    /// Normalize an audio track's loudness.
    async fn normalize_loudness(&self, audio_url: &str) -> Result<String, ProviderError>;

    /// Burn auto-generated captions into a video.
    async fn add_captions(&self, video_url: &str) -> Result<String, ProviderError>;
}

/// Extracts structured scene changes from a free-text revision request.
#[async_trait]
pub trait RevisionAnalyzer: Send + Sync {
    /// Determine which scenes and fields `request` refers to, given the
    /// video's current scenes.
    async fn analyze(
        &self,
        request: &str,
        scenes: &[SceneSnapshot],
        video_id: DbId,
    ) -> Result<Vec<SceneChange>, ProviderError>;
}
