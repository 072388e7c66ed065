//! Voiceover synthesis via the ElevenLabs model hosted on fal.ai.

use async_trait::async_trait;
use serde_json::json;

use crate::error::ProviderError;
use crate::ports::SpeechSynthesizer;
use crate::queue::{result_str, FalQueueClient, PollConfig};

const SPEECH_MODEL_PATH: &str = "fal-ai/elevenlabs/tts/turbo-v2.5";

/// Status for speech jobs is exposed under the provider root, not the
/// full model path.
const SPEECH_POLL_PATH: &str = "fal-ai/elevenlabs";

const VOICE: &str = "Rachel";

const OUTPUT_FORMAT: &str = "mp3";

/// Narration synthesis backed by the hosted ElevenLabs model.
pub struct FalSpeechSynthesizer {
    queue: FalQueueClient,
}

impl FalSpeechSynthesizer {
    pub fn new(queue: FalQueueClient) -> Self {
        Self { queue }
    }
}

#[async_trait]
impl SpeechSynthesizer for FalSpeechSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<String, ProviderError> {
        let payload = json!({
            "text": text,
            "voice": VOICE,
            "output_format": OUTPUT_FORMAT,
        });
        let result = self
            .queue
            .run(
                SPEECH_MODEL_PATH,
                SPEECH_POLL_PATH,
                &payload,
                PollConfig::SPEECH,
            )
            .await?;
        result_str(&result, "/audio/url")
    }
}
