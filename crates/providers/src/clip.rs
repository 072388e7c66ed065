//! Scene clip synthesis via fal.ai's image-to-video model.

use async_trait::async_trait;
use serde_json::json;

use crate::error::ProviderError;
use crate::ports::ClipGenerator;
use crate::queue::{result_str, FalQueueClient, PollConfig};

const CLIP_MODEL_PATH: &str = "fal-ai/minimax/hailuo-02/standard/image-to-video";

/// Clip length in seconds, as the string the model expects.
const CLIP_DURATION: &str = "6";

const CLIP_RESOLUTION: &str = "768P";

/// Clip synthesis backed by fal.ai's image-to-video model.
pub struct FalClipGenerator {
    queue: FalQueueClient,
}

impl FalClipGenerator {
    pub fn new(queue: FalQueueClient) -> Self {
        Self { queue }
    }
}

#[async_trait]
impl ClipGenerator for FalClipGenerator {
    async fn generate_clip(&self, image_url: &str, prompt: &str) -> Result<String, ProviderError> {
        let payload = json!({
            "prompt": prompt,
            "image_url": image_url,
            "duration": CLIP_DURATION,
            "prompt_optimizer": true,
            "resolution": CLIP_RESOLUTION,
        });
        let result = self
            .queue
            .run(CLIP_MODEL_PATH, CLIP_MODEL_PATH, &payload, PollConfig::RENDER)
            .await?;
        result_str(&result, "/video/url")
    }
}
