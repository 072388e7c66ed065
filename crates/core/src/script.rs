//! Scene script shape and validation.
//!
//! Script generation must return exactly [`SCENE_COUNT`] scenes numbered
//! 1..=5 with no gaps or duplicates. Anything else is rejected as a
//! validation failure; there is no partial acceptance.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Script constants
// ---------------------------------------------------------------------------

/// Every video is built from exactly this many scenes.
pub const SCENE_COUNT: usize = 5;

/// Whether `n` is a valid 1-based scene number.
pub fn is_valid_scene_number(n: i32) -> bool {
    n >= 1 && n <= SCENE_COUNT as i32
}

// ---------------------------------------------------------------------------
// Script payload
// ---------------------------------------------------------------------------

/// One scene descriptor as produced by script generation.
///
/// `visual_description` and `voiceover` are mandatory; the remaining
/// direction fields are optional and default to absent when the model
/// omits them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScriptScene {
    pub scene_number: i32,
    pub visual_description: String,
    pub voiceover: String,
    #[serde(default)]
    pub shot_type: Option<String>,
    #[serde(default)]
    pub sound_effects: Option<String>,
    #[serde(default)]
    pub music_direction: Option<String>,
}

/// Top-level script payload: `{"scenes": [...]}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VideoScript {
    pub scenes: Vec<ScriptScene>,
}

/// Validate a parsed script: exactly [`SCENE_COUNT`] scenes whose numbers
/// are exactly 1..=5 (any order, no duplicates).
pub fn validate_script(scenes: &[ScriptScene]) -> Result<(), CoreError> {
    if scenes.len() != SCENE_COUNT {
        return Err(CoreError::Validation(format!(
            "Script must contain exactly {SCENE_COUNT} scenes, got {}",
            scenes.len()
        )));
    }
    let mut numbers: Vec<i32> = scenes.iter().map(|s| s.scene_number).collect();
    numbers.sort_unstable();
    let expected: Vec<i32> = (1..=SCENE_COUNT as i32).collect();
    if numbers != expected {
        return Err(CoreError::Validation(format!(
            "Scene numbers must be exactly 1..={SCENE_COUNT}, got {numbers:?}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Scene snapshot
// ---------------------------------------------------------------------------

/// Text fields of a persisted scene, as consumed by prompt builders and
/// revision intent extraction. Artifact references are not part of the
/// snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct SceneSnapshot {
    pub scene_number: i32,
    pub visual_description: Option<String>,
    pub voiceover: Option<String>,
    pub shot_type: Option<String>,
    pub sound_effects: Option<String>,
    pub music_direction: Option<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
