//! Script generation and revision analysis via the OpenAI chat API.
//!
//! Both operations run a single chat completion and parse JSON out of
//! the assistant's reply, tolerating prose or code fences around it.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde_json::{json, Value};

use reelgen_core::revision::SceneChange;
use reelgen_core::script::{validate_script, SceneSnapshot, VideoScript};
use reelgen_core::types::DbId;

use crate::config::ProvidersConfig;
use crate::error::ProviderError;
use crate::ports::{RevisionAnalyzer, ScriptGenerator};

/// Matches the outermost JSON object in a reply.
static JSON_OBJECT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("valid regex"));

/// Matches the outermost JSON array in a reply.
static JSON_ARRAY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\[.*\]").expect("valid regex"));

const SCRIPT_TEMPERATURE: f64 = 0.7;
const SCRIPT_MAX_TOKENS: u32 = 2000;

const REVISION_TEMPERATURE: f64 = 0.3;
const REVISION_MAX_TOKENS: u32 = 1000;

/// System prompt for turning a structured user prompt into five scenes.
const SCRIPT_SYSTEM_PROMPT: &str = r#"You are an AI assistant that converts structured user video prompts into a JSON scene breakdown.

Your tasks:
1. Parse the user prompt carefully.
2. Extract exactly 5 scenes from the "SCENE-BY-SCENE BREAKDOWN" section of the prompt.
3. Do not add, invent, or modify the visual or voiceover details. Only use what is explicitly written in the user prompt.
4. For each scene, output:
   - "scene_number": The number of the scene.
   - "visual_description": The visual text provided in the prompt.
   - "voiceover": The voiceover text provided in the prompt.
   - "shot_type": Leave empty string `""` if not specified in the prompt.
   - "sound_effects": Generate based on the visual description. Use descriptive, cinematic, and artistic language. Avoid psychological manipulation terms (e.g., tension, fear, FOMO). Focus on immersive, luxury, creative sound effects.
   - "music_direction": Generate based on the vibe, visual, and voiceover. Always use positive, artistic, and creative language. Avoid brand names. Describe styles in terms of cinematic build-ups, dramatic keys, uplifting progressions, refined accents, premium atmosphere, and emotional impact. Emphasize luxury, exclusivity, aspiration, power, and inspiration.
5. Always output valid JSON in this format:
{
  "scenes": [
    {
      "scene_number": 1,
      "visual_description": "...",
      "voiceover": "...",
      "shot_type": "...",
      "sound_effects": "...",
      "music_direction": "..."
    },
    ...
  ]
}
6. Do not include any explanations, markdown formatting, or extra text - only return the final JSON."#;

// ---------------------------------------------------------------------------
// Chat client
// ---------------------------------------------------------------------------

/// Thin client for the OpenAI chat completions endpoint.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct ChatClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl ChatClient {
    pub fn new(config: &ProvidersConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.openai_base_url.clone(),
            api_key: config.openai_api_key.clone(),
            model: config.openai_model.clone(),
        }
    }

    /// Run one completion, returning the assistant message text.
    async fn complete(
        &self,
        system: &str,
        user: &str,
        temperature: f64,
        max_tokens: u32,
    ) -> Result<String, ProviderError> {
        let payload = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
            "temperature": temperature,
            "max_tokens": max_tokens,
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response.json().await?;
        body.pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                ProviderError::Malformed("missing assistant content in chat response".into())
            })
    }
}

// ---------------------------------------------------------------------------
// Script generation
// ---------------------------------------------------------------------------

/// Script generation backed by a chat model.
pub struct OpenAiScriptGenerator {
    chat: ChatClient,
}

impl OpenAiScriptGenerator {
    pub fn new(chat: ChatClient) -> Self {
        Self { chat }
    }
}

#[async_trait]
impl ScriptGenerator for OpenAiScriptGenerator {
    async fn generate_script(&self, user_prompt: &str) -> Result<VideoScript, ProviderError> {
        let user_message = script_user_message(user_prompt);
        let content = self
            .chat
            .complete(
                SCRIPT_SYSTEM_PROMPT,
                &user_message,
                SCRIPT_TEMPERATURE,
                SCRIPT_MAX_TOKENS,
            )
            .await?;

        tracing::debug!(chars = content.len(), "Received script reply");

        let script = parse_script(&content)?;
        validate_script(&script.scenes).map_err(|e| ProviderError::Malformed(e.to_string()))?;
        Ok(script)
    }
}

/// User message restating the prompt and the expected output shape.
fn script_user_message(user_prompt: &str) -> String {
    format!(
        r#"
user prompt: {user_prompt}

Output in JSON format:
{{
  "scenes": [
    {{
      "scene_number": 1,
      "visual_description": "...",
      "voiceover": "...",
      "shot_type": "...",
      "sound_effects": "...",
      "music_direction": "..."
    }},
    ...
  ]
}}

5 scenes
"#
    )
}

/// Parse the assistant reply into a script, falling back to the first
/// JSON object embedded in surrounding prose.
fn parse_script(content: &str) -> Result<VideoScript, ProviderError> {
    if let Ok(script) = serde_json::from_str::<VideoScript>(content) {
        return Ok(script);
    }
    let captured = JSON_OBJECT_RE
        .find(content)
        .ok_or_else(|| ProviderError::Malformed("no JSON object in script reply".into()))?;
    serde_json::from_str(captured.as_str())
        .map_err(|e| ProviderError::Malformed(format!("invalid script JSON: {e}")))
}

// ---------------------------------------------------------------------------
// Revision analysis
// ---------------------------------------------------------------------------

/// Revision analysis backed by a chat model.
pub struct OpenAiRevisionAnalyzer {
    chat: ChatClient,
}

impl OpenAiRevisionAnalyzer {
    pub fn new(chat: ChatClient) -> Self {
        Self { chat }
    }
}

#[async_trait]
impl RevisionAnalyzer for OpenAiRevisionAnalyzer {
    async fn analyze(
        &self,
        request: &str,
        scenes: &[SceneSnapshot],
        video_id: DbId,
    ) -> Result<Vec<SceneChange>, ProviderError> {
        let system = revision_system_prompt(request, video_id);
        let user = format!(
            "{}\nUser revision request: {}",
            scenes_digest(scenes),
            request
        );
        let content = self
            .chat
            .complete(&system, &user, REVISION_TEMPERATURE, REVISION_MAX_TOKENS)
            .await?;

        tracing::debug!(chars = content.len(), "Received revision analysis reply");

        parse_changes(&content)
    }
}

/// System prompt binding the feedback and video identifier into the
/// analysis instructions.
fn revision_system_prompt(request: &str, video_id: DbId) -> String {
    format!(
        r#"You are an AI video revision analyst.

The user has asked for a change to an existing five-scene video. Work out exactly which scene(s) and field(s) the feedback refers to.

Steps to follow:

1. Take the user feedback: "{request}"
2. The video's current scenes are provided in the user message.
3. Search through each scene (check scene_number, voiceover, visual_description, music_direction, sound_effects).
4. Identify the exact scene(s) and field(s) that the feedback refers to.
5. For each affected scene, produce the new value for every field the user mentioned, and leave fields the user did not mention out.
6. Return a JSON array summarizing what was changed (only include the fields that were actually modified).

Example response:
```json
[
  {{
    "scene_number": 1,
    "changed": {{
      "voiceover": "New voiceover text here"
    }}
  }}
]
```

If the user asks to change the music or sound effects, always use positive, artistic, and creative language. Avoid words related to psychological manipulation. Describe music in terms of cinematic build-ups, dramatic keys, uplifting progressions, refined accents, premium atmosphere, and emotional impact.

video_id: {video_id}"#
    )
}

/// Render the current scenes the way the analyst expects to read them.
fn scenes_digest(scenes: &[SceneSnapshot]) -> String {
    let mut text = String::from("Existing scenes:\n");
    for scene in scenes {
        text.push_str(&format!(
            "Scene {}:\n- voiceover: {}\n- visual_description: {}\n- music_direction: {}\n- sound_effects: {}\n\n",
            scene.scene_number,
            scene.voiceover.as_deref().unwrap_or(""),
            scene.visual_description.as_deref().unwrap_or(""),
            scene.music_direction.as_deref().unwrap_or(""),
            scene.sound_effects.as_deref().unwrap_or(""),
        ));
    }
    text
}

/// Parse the assistant reply into scene changes, preferring the first
/// JSON array embedded in surrounding prose.
fn parse_changes(content: &str) -> Result<Vec<SceneChange>, ProviderError> {
    let text = JSON_ARRAY_RE
        .find(content)
        .map(|m| m.as_str())
        .unwrap_or(content);
    serde_json::from_str(text)
        .map_err(|e| ProviderError::Malformed(format!("invalid revision analysis JSON: {e}")))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
