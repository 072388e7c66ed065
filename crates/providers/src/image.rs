//! Image reframing and enhancement via fal.ai.

use async_trait::async_trait;
use serde_json::json;

use crate::error::ProviderError;
use crate::ports::ImageEditor;
use crate::queue::{result_str, FalQueueClient, PollConfig};

/// Target aspect ratio for vertical output.
const ASPECT_RATIO: &str = "9:16";

/// Prompt steering the reframe model to extend the background rather
/// than stretch the subject.
const REFRAME_PROMPT: &str = "Resize this image to a 9:16 aspect ratio. Automatically detect \
    the background and extend it seamlessly to fill the extra space, keeping the subject \
    untouched. Do not stretch or distort the subject, only expand the natural background so \
    the final image looks natural and consistent.";

/// Image editing backed by fal.ai's reframe and edit models.
pub struct FalImageEditor {
    queue: FalQueueClient,
}

impl FalImageEditor {
    pub fn new(queue: FalQueueClient) -> Self {
        Self { queue }
    }
}

#[async_trait]
impl ImageEditor for FalImageEditor {
    async fn reframe(&self, image_url: &str) -> Result<String, ProviderError> {
        let payload = json!({
            "image_url": image_url,
            "aspect_ratio": ASPECT_RATIO,
            "prompt": REFRAME_PROMPT,
        });
        let result = self
            .queue
            .run(
                "fal-ai/luma-photon/reframe",
                "fal-ai/luma-photon",
                &payload,
                PollConfig::MEDIA,
            )
            .await?;
        result_str(&result, "/images/0/url")
    }

    async fn enhance(
        &self,
        image_url: &str,
        visual_description: &str,
    ) -> Result<String, ProviderError> {
        let payload = json!({
            "prompt": visual_description,
            "image_urls": [image_url],
            "aspect_ratio": ASPECT_RATIO,
        });
        let result = self
            .queue
            .run(
                "fal-ai/gemini-25-flash-image/edit",
                "fal-ai/gemini-25-flash-image",
                &payload,
                PollConfig::MEDIA,
            )
            .await?;
        result_str(&result, "/images/0/url")
    }
}
