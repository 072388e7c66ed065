//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod event_repo;
pub mod music_repo;
pub mod revision_repo;
pub mod scene_repo;
pub mod task_repo;
pub mod video_repo;

pub use event_repo::EventRepo;
pub use music_repo::MusicRepo;
pub use revision_repo::RevisionRepo;
pub use scene_repo::SceneRepo;
pub use task_repo::TaskRepo;
pub use video_repo::VideoRepo;
