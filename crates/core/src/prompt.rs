//! Prompt construction for clip and music synthesis.

use crate::script::SceneSnapshot;

// ---------------------------------------------------------------------------
// Clip prompts
// ---------------------------------------------------------------------------

/// Build the prompt for synthesizing one scene clip from its enhanced
/// image. Combines the voiceover text (for pacing) with the visual
/// description, prefixed with a caption-suppression instruction so the
/// provider does not burn in its own subtitles.
pub fn clip_prompt(voiceover: &str, visual_description: &str) -> String {
    sanitize_prompt_text(&format!(
        "Do not add caption to the video voiceover:{voiceover} visual_description:{visual_description}"
    ))
}

/// Escape double quotes and flatten newlines so the text survives being
/// embedded in a provider request payload.
pub fn sanitize_prompt_text(text: &str) -> String {
    text.replace('"', "\\\"").replace('\n', " ")
}

// ---------------------------------------------------------------------------
// Music prompt
// ---------------------------------------------------------------------------

/// Used when no scene carries any music direction.
pub const FALLBACK_MUSIC_PROMPT: &str =
    "cinematic orchestral background music, uplifting and premium atmosphere";

/// Appended to every music prompt to keep the track instrumental.
pub const INSTRUMENTAL_SUFFIX: &str = " (no words only melody)";

/// Build the single global music prompt from all scenes' direction text.
///
/// Collects every non-empty `music_direction`, plus any `sound_effects`
/// text that mentions music (other effect text describes diegetic sound,
/// not score). Falls back to [`FALLBACK_MUSIC_PROMPT`] when nothing was
/// collected, then appends [`INSTRUMENTAL_SUFFIX`].
pub fn build_music_prompt(scenes: &[SceneSnapshot]) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for scene in scenes {
        if let Some(direction) = scene.music_direction.as_deref() {
            if !direction.trim().is_empty() {
                parts.push(direction);
            }
        }
        if let Some(effects) = scene.sound_effects.as_deref() {
            if effects.to_lowercase().contains("music") {
                parts.push(effects);
            }
        }
    }
    let combined = parts.join(" ");
    let base = if combined.trim().is_empty() {
        FALLBACK_MUSIC_PROMPT
    } else {
        combined.as_str()
    };
    format!("{base}{INSTRUMENTAL_SUFFIX}")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
