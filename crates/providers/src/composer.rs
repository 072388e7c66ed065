//! Video composition, loudness normalization, and captioning via
//! fal.ai's ffmpeg pipeline.

use async_trait::async_trait;
use serde_json::{json, Value};

use reelgen_core::timeline::{AudioTrack, SCENE_DURATION_SECS, TIMELINE_DURATION_SECS};

use crate::error::ProviderError;
use crate::ports::VideoComposer;
use crate::queue::{result_str, FalQueueClient, PollConfig};

const COMPOSE_PATH: &str = "fal-ai/ffmpeg-api/compose";
const LOUDNORM_PATH: &str = "fal-ai/ffmpeg-api/loudnorm";

/// Compose and loudnorm jobs report status under the ffmpeg root.
const FFMPEG_POLL_PATH: &str = "fal-ai/ffmpeg-api";

const CAPTION_PATH: &str = "fal-ai/auto-caption";

/// Loudness target offset for background music normalization.
const LOUDNORM_OFFSET: i32 = -13;

// -- Caption styling --
const CAPTION_COLOR: &str = "white";
const CAPTION_FONT_URL: &str =
    "https://nvrjvjxtfwdtuyvysnyz.supabase.co/storage/v1/object/public/font/Poppins-Bold.ttf";
const CAPTION_FONT_SIZE: u32 = 35;

/// Composition backed by fal.ai's ffmpeg and auto-caption models.
pub struct FalVideoComposer {
    queue: FalQueueClient,
}

impl FalVideoComposer {
    pub fn new(queue: FalQueueClient) -> Self {
        Self { queue }
    }
}

#[async_trait]
impl VideoComposer for FalVideoComposer {
    async fn concat_clips(&self, clip_urls: &[String]) -> Result<String, ProviderError> {
        let payload = concat_payload(clip_urls);
        let result = self
            .queue
            .run(COMPOSE_PATH, FFMPEG_POLL_PATH, &payload, PollConfig::RENDER)
            .await?;
        result_str(&result, "/video_url")
    }

    async fn overlay_audio(
        &self,
        video_url: &str,
        voiceovers: &[AudioTrack],
        music: Option<&AudioTrack>,
    ) -> Result<String, ProviderError> {
        let payload = timeline_payload(video_url, voiceovers, music);
        let result = self
            .queue
            .run(COMPOSE_PATH, FFMPEG_POLL_PATH, &payload, PollConfig::RENDER)
            .await?;
        result_str(&result, "/video_url")
    }

    async fn normalize_loudness(&self, audio_url: &str) -> Result<String, ProviderError> {
        let payload = json!({
            "audio_url": audio_url,
            "offset": LOUDNORM_OFFSET,
        });
        let result = self
            .queue
            .run(LOUDNORM_PATH, FFMPEG_POLL_PATH, &payload, PollConfig::MEDIA)
            .await?;
        result_str(&result, "/audio/url")
    }

    async fn add_captions(&self, video_url: &str) -> Result<String, ProviderError> {
        let payload = json!({
            "video_url": video_url,
            "txt_color": CAPTION_COLOR,
            "txt_font": CAPTION_FONT_URL,
            "font_size": CAPTION_FONT_SIZE,
            "stroke_width": 1,
            "left_align": "center",
            "top_align": "center",
            "refresh_interval": 0.6,
        });
        let result = self
            .queue
            .run(CAPTION_PATH, CAPTION_PATH, &payload, PollConfig::RENDER)
            .await?;
        result_str(&result, "/video_url")
    }
}

// ---------------------------------------------------------------------------
// Payload builders
// ---------------------------------------------------------------------------

/// Concat-mode payload: scene clips laid end to end on one video track.
fn concat_payload(clip_urls: &[String]) -> Value {
    let keyframes: Vec<Value> = clip_urls
        .iter()
        .enumerate()
        .map(|(i, url)| {
            json!({
                "url": url,
                "timestamp": i as u32 * SCENE_DURATION_SECS,
                "duration": SCENE_DURATION_SECS,
            })
        })
        .collect();

    json!({
        "compose_mode": "concat",
        "tracks": [{
            "id": "main",
            "type": "video",
            "keyframes": keyframes,
        }],
    })
}

/// Timeline-mode payload: the merged video with its own audio muted,
/// voiceover placements, and an optional full-length music bed.
fn timeline_payload(
    video_url: &str,
    voiceovers: &[AudioTrack],
    music: Option<&AudioTrack>,
) -> Value {
    let voiceover_keyframes: Vec<Value> = voiceovers.iter().map(audio_keyframe).collect();

    let mut tracks = vec![
        json!({
            "id": "video_main",
            "type": "video",
            "keyframes": [{
                "url": video_url,
                "timestamp": 0,
                "duration": TIMELINE_DURATION_SECS,
                "include_audio": false,
            }],
        }),
        json!({
            "id": "voiceover",
            "type": "audio",
            "keyframes": voiceover_keyframes,
        }),
    ];

    if let Some(track) = music {
        tracks.push(json!({
            "id": "background_music",
            "type": "audio",
            "keyframes": [audio_keyframe(track)],
        }));
    }

    json!({
        "compose_mode": "timeline",
        "tracks": tracks,
    })
}

/// Keyframe JSON for one audio placement.
fn audio_keyframe(track: &AudioTrack) -> Value {
    json!({
        "url": track.url,
        "timestamp": track.start_secs,
        "duration": track.duration_secs,
        "volume": track.volume,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
