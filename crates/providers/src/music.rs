//! Background music synthesis via the Lyria model hosted on fal.ai.

use async_trait::async_trait;
use serde_json::json;

use crate::error::ProviderError;
use crate::ports::MusicGenerator;
use crate::queue::{result_str, FalQueueClient, PollConfig};

const MUSIC_MODEL_PATH: &str = "fal-ai/lyria2";

/// Steers the model away from sung content and lethargic pacing.
const NEGATIVE_PROMPT: &str = "vocals, slow tempo";

/// Instrumental track synthesis backed by the hosted Lyria model.
///
/// Expects the fully assembled direction prompt; see
/// [`reelgen_core::prompt::build_music_prompt`].
pub struct FalMusicGenerator {
    queue: FalQueueClient,
}

impl FalMusicGenerator {
    pub fn new(queue: FalQueueClient) -> Self {
        Self { queue }
    }
}

#[async_trait]
impl MusicGenerator for FalMusicGenerator {
    async fn generate_music(&self, prompt: &str) -> Result<String, ProviderError> {
        let payload = json!({
            "prompt": prompt,
            "negative_prompt": NEGATIVE_PROMPT,
        });
        let result = self
            .queue
            .run(MUSIC_MODEL_PATH, MUSIC_MODEL_PATH, &payload, PollConfig::MEDIA)
            .await?;
        result_str(&result, "/audio/url")
    }
}
