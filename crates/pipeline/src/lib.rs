//! Generation and revision pipelines.
//!
//! The generation pipeline drives a video through its seven stages,
//! persisting each stage's status as a checkpoint before the stage runs.
//! The revision pipeline regenerates only the artifacts a change request
//! invalidates, then recomposes. Both are built from the shared
//! [`StageRunner`] primitives and run against injected capability traits,
//! so the whole orchestration is testable with in-memory fakes.

pub mod config;
pub mod error;
pub mod generation;
pub mod revision;
pub mod stages;

pub use config::{PipelineConfig, VoiceoverFailurePolicy};
pub use error::PipelineError;
pub use generation::GenerationPipeline;
pub use revision::RevisionPipeline;
pub use stages::StageRunner;
