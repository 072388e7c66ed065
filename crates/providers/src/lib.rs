//! Clients for the external generation services.
//!
//! Media synthesis runs through fal.ai's HTTP queue: a job is submitted
//! with a POST, the response carries a request ID, and the ID is polled
//! until the job settles. Script generation and revision analysis run
//! through the OpenAI chat completions API. The traits in [`ports`] are
//! the seams the pipelines consume, so tests can substitute fakes.

pub mod clip;
pub mod composer;
pub mod config;
pub mod error;
pub mod image;
pub mod music;
pub mod openai;
pub mod ports;
pub mod queue;
pub mod speech;

pub use clip::FalClipGenerator;
pub use composer::FalVideoComposer;
pub use config::ProvidersConfig;
pub use error::ProviderError;
pub use image::FalImageEditor;
pub use music::FalMusicGenerator;
pub use openai::{ChatClient, OpenAiRevisionAnalyzer, OpenAiScriptGenerator};
pub use ports::{
    ClipGenerator, ImageEditor, MusicGenerator, RevisionAnalyzer, ScriptGenerator,
    SpeechSynthesizer, VideoComposer,
};
pub use queue::{FalQueueClient, PollConfig};
pub use speech::FalSpeechSynthesizer;
