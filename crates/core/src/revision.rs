//! Revision change model and regeneration-consequence classification.
//!
//! Intent extraction returns, per scene, a map of field name to new value.
//! Each recognized field carries a regeneration consequence: a new visual
//! description invalidates that scene's clip, new voiceover text
//! invalidates that scene's narration, and any music-related change
//! invalidates the single global music track. Shot type is applied but
//! regenerates nothing on its own. Composition is always redone by the
//! caller regardless of the plan.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::script::is_valid_scene_number;

// ---------------------------------------------------------------------------
// Change payload
// ---------------------------------------------------------------------------

/// Scene fields a revision may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneField {
    VisualDescription,
    Voiceover,
    SoundEffects,
    MusicDirection,
    ShotType,
}

impl SceneField {
    /// Parse a field name as returned by intent extraction. Unknown names
    /// yield `None` and are skipped by classification.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "visual_description" => Some(Self::VisualDescription),
            "voiceover" => Some(Self::Voiceover),
            "sound_effects" => Some(Self::SoundEffects),
            "music_direction" => Some(Self::MusicDirection),
            "shot_type" => Some(Self::ShotType),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VisualDescription => "visual_description",
            Self::Voiceover => "voiceover",
            Self::SoundEffects => "sound_effects",
            Self::MusicDirection => "music_direction",
            Self::ShotType => "shot_type",
        }
    }
}

/// One entry of an intent-extraction result: the targeted scene and the
/// fields the request changes, mapped to their new values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SceneChange {
    pub scene_number: i32,
    #[serde(default)]
    pub changed: BTreeMap<String, String>,
}

impl SceneChange {
    /// Iterate the recognized field changes, dropping unknown names.
    pub fn known_changes(&self) -> impl Iterator<Item = (SceneField, &str)> {
        self.changed
            .iter()
            .filter_map(|(name, value)| SceneField::parse(name).map(|f| (f, value.as_str())))
    }
}

// ---------------------------------------------------------------------------
// Consequence classification
// ---------------------------------------------------------------------------

/// Which regeneration paths a set of changes requires.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevisionPlan {
    /// Scenes whose clip must be re-synthesized.
    pub clip_scenes: BTreeSet<i32>,
    /// Scenes whose voiceover must be re-synthesized.
    pub voiceover_scenes: BTreeSet<i32>,
    /// Whether the global music track must be regenerated.
    pub regenerate_music: bool,
    /// Scene numbers outside 1..=5, dropped from the plan.
    pub skipped_scenes: Vec<i32>,
    /// `(scene_number, field_name)` pairs with unrecognized field names.
    pub skipped_fields: Vec<(i32, String)>,
}

impl RevisionPlan {
    /// True when no regeneration path was marked. The caller still
    /// recomposes; applied text changes alone can matter for captions.
    pub fn regenerates_nothing(&self) -> bool {
        self.clip_scenes.is_empty() && self.voiceover_scenes.is_empty() && !self.regenerate_music
    }
}

/// Classify extracted changes into a [`RevisionPlan`].
///
/// Out-of-range scene numbers and unknown field names are recorded as
/// skipped rather than failing the revision; the remaining valid changes
/// still apply.
pub fn classify_changes(changes: &[SceneChange]) -> RevisionPlan {
    let mut plan = RevisionPlan::default();
    for change in changes {
        if !is_valid_scene_number(change.scene_number) {
            plan.skipped_scenes.push(change.scene_number);
            continue;
        }
        for name in change.changed.keys() {
            match SceneField::parse(name) {
                Some(SceneField::VisualDescription) => {
                    plan.clip_scenes.insert(change.scene_number);
                }
                Some(SceneField::Voiceover) => {
                    plan.voiceover_scenes.insert(change.scene_number);
                }
                Some(SceneField::SoundEffects) | Some(SceneField::MusicDirection) => {
                    plan.regenerate_music = true;
                }
                Some(SceneField::ShotType) => {}
                None => plan.skipped_fields.push((change.scene_number, name.clone())),
            }
        }
    }
    plan
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
