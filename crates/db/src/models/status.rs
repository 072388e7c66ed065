//! Lifecycle status enums mapping to PostgreSQL enum types.
//!
//! Each variant's text form matches the corresponding database enum label
//! (snake_case). Statuses are the single source of truth for where an
//! entity sits in its pipeline.

use serde::Serialize;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident ($pg_type:literal) {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq,
            serde::Serialize, serde::Deserialize, sqlx::Type,
        )]
        #[sqlx(type_name = $pg_type, rename_all = "snake_case")]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Database and wire representation.
            pub fn as_str(self) -> &'static str {
                match self { $( Self::$variant => $text ),+ }
            }

            /// Parse the database/wire representation.
            pub fn parse(value: &str) -> Option<Self> {
                match value {
                    $( $text => Some(Self::$variant), )+
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

define_status_enum! {
    /// Video lifecycle. The seven stage statuses are checkpoints: each is
    /// persisted before its stage's work begins, so a crashed run leaves
    /// the last attempted stage on record.
    VideoStatus ("video_status") {
        Pending => "pending",
        ProcessingScript => "processing_script",
        ProcessingImages => "processing_images",
        GeneratingScenes => "generating_scenes",
        GeneratingVoiceovers => "generating_voiceovers",
        GeneratingMusic => "generating_music",
        ComposingVideo => "composing_video",
        AddingCaptions => "adding_captions",
        Completed => "completed",
        Failed => "failed",
        RevisionRequested => "revision_requested",
        ProcessingRevision => "processing_revision",
    }
}

define_status_enum! {
    /// Revision lifecycle.
    RevisionStatus ("revision_status") {
        Pending => "pending",
        Completed => "completed",
        Failed => "failed",
    }
}

define_status_enum! {
    /// Queue task execution status.
    TaskStatus ("task_status") {
        Pending => "pending",
        Running => "running",
        Completed => "completed",
        Failed => "failed",
    }
}

// ---------------------------------------------------------------------------
// Progress reporting
// ---------------------------------------------------------------------------

/// Client-facing progress for a status: which of the seven generation
/// stages is underway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub current: u32,
    pub total: u32,
    pub message: &'static str,
}

/// Number of generation stages reported to clients.
pub const STAGE_TOTAL: u32 = 7;

impl VideoStatus {
    /// Whether the video has finished its current pipeline, successfully
    /// or not.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Progress display for this status.
    pub fn progress(self) -> Progress {
        let (current, message) = match self {
            Self::Pending => (0, "Video queued for processing"),
            Self::ProcessingScript => (1, "Generating video script..."),
            Self::ProcessingImages => (2, "Processing images..."),
            Self::GeneratingScenes => (3, "Generating scene videos..."),
            Self::GeneratingVoiceovers => (4, "Creating voiceovers..."),
            Self::GeneratingMusic => (5, "Generating background music..."),
            Self::ComposingVideo => (6, "Composing final video..."),
            Self::AddingCaptions => (7, "Adding captions..."),
            Self::Completed => (7, "Video generation completed!"),
            Self::Failed => (0, "Video generation failed"),
            Self::RevisionRequested => (0, "Revision queued"),
            Self::ProcessingRevision => (0, "Processing revision..."),
        };
        Progress {
            current,
            total: STAGE_TOTAL,
            message,
        }
    }
}
