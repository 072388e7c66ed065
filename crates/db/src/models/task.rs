//! Queue task entity model and payloads.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use reelgen_core::types::{DbId, Timestamp};

use crate::models::status::TaskStatus;

/// Kind of pipeline a task runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    GenerateVideo,
    ProcessRevision,
}

impl TaskKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GenerateVideo => "generate_video",
            Self::ProcessRevision => "process_revision",
        }
    }

    /// Total attempts allowed for this kind, the first included.
    pub fn max_attempts(self) -> i32 {
        match self {
            Self::GenerateVideo => 3,
            Self::ProcessRevision => 2,
        }
    }

    /// Fixed delay before a failed attempt is retried.
    pub fn retry_delay_secs(self) -> i64 {
        match self {
            Self::GenerateVideo => 60,
            Self::ProcessRevision => 120,
        }
    }
}

/// A row from the `tasks` table.
///
/// `attempts` counts claims, not failures: it is incremented when the task
/// is claimed, so a task picked up for the third time with
/// `max_attempts = 3` is on its final attempt.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Task {
    pub id: DbId,
    pub kind: TaskKind,
    pub video_id: DbId,
    pub payload: serde_json::Value,
    pub status: TaskStatus,
    pub attempts: i32,
    pub max_attempts: i32,
    pub last_error: Option<String>,
    /// Earliest time the task may be claimed; retries push this forward.
    pub run_at: Timestamp,
    pub claimed_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Task {
    /// Whether another attempt remains after the current one fails.
    pub fn has_attempts_left(&self) -> bool {
        self.attempts < self.max_attempts
    }
}

/// Payload carried by [`TaskKind::ProcessRevision`] tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevisionTaskPayload {
    pub revision_id: DbId,
    pub request_text: String,
    /// Identifier assigned to the regenerated artifact, minted at intake.
    pub new_video_id: DbId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn task(attempts: i32, max_attempts: i32) -> Task {
        Task {
            id: Uuid::new_v4(),
            kind: TaskKind::GenerateVideo,
            video_id: Uuid::new_v4(),
            payload: serde_json::json!({}),
            status: TaskStatus::Running,
            attempts,
            max_attempts,
            last_error: None,
            run_at: Utc::now(),
            claimed_at: None,
            completed_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn attempts_left_until_max_reached() {
        assert!(task(1, 3).has_attempts_left());
        assert!(task(2, 3).has_attempts_left());
        assert!(!task(3, 3).has_attempts_left());
    }

    #[test]
    fn revision_payload_round_trips() {
        let payload = RevisionTaskPayload {
            revision_id: Uuid::new_v4(),
            request_text: "make scene 2 brighter".to_string(),
            new_video_id: Uuid::new_v4(),
        };
        let value = serde_json::to_value(&payload).unwrap();
        let back: RevisionTaskPayload = serde_json::from_value(value).unwrap();
        assert_eq!(back.revision_id, payload.revision_id);
        assert_eq!(back.request_text, payload.request_text);
    }
}
