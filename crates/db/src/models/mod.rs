//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod event;
pub mod music;
pub mod revision;
pub mod scene;
pub mod status;
pub mod task;
pub mod video;

pub use event::StoredEvent;
pub use music::{Music, UpsertMusic};
pub use revision::{CreateRevision, Revision};
pub use scene::{Scene, UpdateScene};
pub use status::{Progress, RevisionStatus, TaskStatus, VideoStatus};
pub use task::{RevisionTaskPayload, Task, TaskKind};
pub use video::{CreateVideo, Video, VideoListQuery};
