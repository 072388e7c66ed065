//! Domain logic for the reelgen video pipeline.
//!
//! Pure types and functions with no I/O, consumed by every other crate:
//!
//! - [`script`] -- scene script shape returned by script generation and its
//!   validation rules (exactly five scenes, numbered 1..=5).
//! - [`prompt`] -- prompt construction for clip synthesis and the global
//!   music track.
//! - [`timeline`] -- fixed-timeline math: 6-second segments, 30-second
//!   total, audio overlay track placement.
//! - [`revision`] -- the change model produced by revision intent
//!   extraction and its regeneration-consequence classification.

pub mod error;
pub mod prompt;
pub mod revision;
pub mod script;
pub mod timeline;
pub mod types;

pub use error::CoreError;
pub use revision::{RevisionPlan, SceneChange, SceneField};
pub use script::{SceneSnapshot, ScriptScene, VideoScript, SCENE_COUNT};
pub use timeline::{AudioTrack, SCENE_DURATION_SECS, TIMELINE_DURATION_SECS};
pub use types::{DbId, Timestamp};
