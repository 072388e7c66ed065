//! Task claim-and-execute loop.
//!
//! One long-lived Tokio task per worker process. Claims go through
//! `SELECT FOR UPDATE SKIP LOCKED` via [`TaskRepo::claim_next`] so
//! concurrent workers never double-run a task, and each claimed run is
//! bounded by a wall-clock budget. A budget overrun counts as a
//! retryable failure; the pipelines' own row bookkeeping is repeated
//! here on terminal failures because an overrun drops the run mid-write.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use reelgen_db::models::status::VideoStatus;
use reelgen_db::models::task::{RevisionTaskPayload, Task, TaskKind};
use reelgen_db::repositories::TaskRepo;
use reelgen_db::{DbPool, VideoStore};
use reelgen_events::{EventBus, FailureNotice, Notifier, PipelineEvent};
use reelgen_pipeline::{GenerationPipeline, PipelineError, RevisionPipeline};
use reelgen_providers::ProviderError;

use crate::config::WorkerConfig;

/// Single-concurrency task executor.
///
/// Runs one claimed task at a time; horizontal scale comes from running
/// more worker processes against the same queue.
pub struct TaskRunner {
    pool: DbPool,
    store: Arc<dyn VideoStore>,
    generation: GenerationPipeline,
    revision: RevisionPipeline,
    notifier: Arc<dyn Notifier>,
    bus: Arc<EventBus>,
    config: WorkerConfig,
}

impl TaskRunner {
    pub fn new(
        pool: DbPool,
        store: Arc<dyn VideoStore>,
        generation: GenerationPipeline,
        revision: RevisionPipeline,
        notifier: Arc<dyn Notifier>,
        bus: Arc<EventBus>,
        config: WorkerConfig,
    ) -> Self {
        Self {
            pool,
            store,
            generation,
            revision,
            notifier,
            bus,
            config,
        }
    }

    /// Run the claim loop until the cancellation token is triggered.
    ///
    /// A run already in flight does not observe the token until it
    /// finishes; callers bound the join and rely on the stale sweep to
    /// recover an abandoned claim.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(Duration::from_secs(self.config.poll_interval_secs));
        let mut last_sweep = Instant::now();
        tracing::info!(
            poll_interval_secs = self.config.poll_interval_secs,
            task_timeout_secs = self.config.task_timeout_secs,
            "Task runner started",
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Task runner shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    match TaskRepo::claim_next(&self.pool).await {
                        Ok(Some(task)) => self.process(task).await,
                        Ok(None) => self.maybe_release_stale(&mut last_sweep).await,
                        Err(e) => tracing::error!(error = %e, "Task claim failed"),
                    }
                }
            }
        }
    }

    /// Execute one claimed task within the configured budget and settle
    /// the queue row according to the outcome.
    async fn process(&self, task: Task) {
        tracing::info!(
            task_id = %task.id,
            video_id = %task.video_id,
            kind = task.kind.as_str(),
            attempt = task.attempts,
            max_attempts = task.max_attempts,
            "Task claimed",
        );

        let budget = Duration::from_secs(self.config.task_timeout_secs);
        let outcome = match tokio::time::timeout(budget, self.execute(&task)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(PipelineError::Provider(ProviderError::Timeout {
                request_id: task.id.to_string(),
                budget_secs: self.config.task_timeout_secs,
            })),
        };

        match outcome {
            Ok(()) => self.finish(&task).await,
            Err(err) => self.handle_failure(&task, err).await,
        }
    }

    async fn execute(&self, task: &Task) -> Result<(), PipelineError> {
        match task.kind {
            TaskKind::GenerateVideo => self.generation.run(task.video_id).await,
            TaskKind::ProcessRevision => {
                let payload = parse_revision_payload(task)?;
                self.revision
                    .run(task.video_id, payload.revision_id, payload.new_video_id)
                    .await
            }
        }
    }

    async fn finish(&self, task: &Task) {
        if let Err(e) = TaskRepo::complete(&self.pool, task.id).await {
            tracing::error!(task_id = %task.id, error = %e, "Failed to mark task complete");
        }
        let event_type = match task.kind {
            TaskKind::GenerateVideo => "video.completed",
            TaskKind::ProcessRevision => "revision.completed",
        };
        self.bus.publish(
            PipelineEvent::new(event_type)
                .for_video(task.video_id)
                .with_payload(serde_json::json!({ "task_id": task.id })),
        );
        tracing::info!(task_id = %task.id, video_id = %task.video_id, "Task completed");
    }

    async fn handle_failure(&self, task: &Task, err: PipelineError) {
        let error_text = err.to_string();

        if err.is_retryable() && task.has_attempts_left() {
            tracing::warn!(
                task_id = %task.id,
                attempt = task.attempts,
                max_attempts = task.max_attempts,
                error = %error_text,
                "Task failed, returning to the queue",
            );
            if let Err(e) =
                TaskRepo::reschedule(&self.pool, task.id, task.kind.retry_delay_secs(), &error_text)
                    .await
            {
                tracing::error!(task_id = %task.id, error = %e, "Failed to reschedule task");
            }
            return;
        }

        tracing::error!(
            task_id = %task.id,
            video_id = %task.video_id,
            error = %error_text,
            "Task failed terminally",
        );
        if let Err(e) = TaskRepo::fail(&self.pool, task.id, &error_text).await {
            tracing::error!(task_id = %task.id, error = %e, "Failed to mark task failed");
        }

        // A state rejection means the rows moved on while this delivery
        // was in flight (video already finished, revision superseding a
        // pending retry). They are where they should be; writing failure
        // state here would clobber them.
        if matches!(err, PipelineError::State(_)) {
            return;
        }

        self.settle_failed_rows(task, &error_text).await;
        self.publish_failure(task, &error_text);
        self.notify_failure(task, &error_text).await;
    }

    /// Bring the video and revision rows to their terminal state.
    ///
    /// The pipelines do this themselves on an in-band failure; repeating
    /// the writes here covers a budget overrun, where the run was dropped
    /// before its own bookkeeping.
    async fn settle_failed_rows(&self, task: &Task, error_text: &str) {
        match task.kind {
            TaskKind::GenerateVideo => {
                if let Err(e) = self.store.set_failed(task.video_id, error_text).await {
                    tracing::error!(video_id = %task.video_id, error = %e, "Failed to mark video failed");
                }
            }
            TaskKind::ProcessRevision => {
                let Ok(payload) = parse_revision_payload(task) else {
                    return;
                };
                if let Err(e) = self.store.fail_revision(payload.revision_id, error_text).await {
                    tracing::error!(
                        revision_id = %payload.revision_id,
                        error = %e,
                        "Failed to mark revision failed",
                    );
                }
                // The parent keeps serving its last good artifact.
                if let Err(e) = self
                    .store
                    .set_status(task.video_id, VideoStatus::Completed)
                    .await
                {
                    tracing::error!(video_id = %task.video_id, error = %e, "Failed to restore video status");
                }
            }
        }
    }

    fn publish_failure(&self, task: &Task, error_text: &str) {
        let event_type = match task.kind {
            TaskKind::GenerateVideo => "video.failed",
            TaskKind::ProcessRevision => "revision.failed",
        };
        self.bus.publish(
            PipelineEvent::new(event_type)
                .for_video(task.video_id)
                .with_payload(serde_json::json!({ "task_id": task.id, "error": error_text })),
        );
    }

    /// Send the terminal failure callback. Needs the video row for the
    /// chat correlation fields; without it the callback is skipped.
    async fn notify_failure(&self, task: &Task, error_text: &str) {
        let video = match self.store.get_video(task.video_id).await {
            Ok(video) => video,
            Err(e) => {
                tracing::warn!(
                    video_id = %task.video_id,
                    error = %e,
                    "Skipping failure callback, video row unavailable",
                );
                return;
            }
        };
        let notice = FailureNotice {
            video_id: video.id,
            chat_id: video.chat_id.unwrap_or_default(),
            user_id: video.user_id,
            error: error_text.to_string(),
        };
        if let Err(e) = self.notifier.notify_failure(&notice).await {
            tracing::warn!(video_id = %task.video_id, error = %e, "Failure callback delivery failed");
        }
    }
}

/// Decode the revision payload carried by a `process_revision` task.
/// An unreadable payload is a validation failure, not worth retrying.
fn parse_revision_payload(task: &Task) -> Result<RevisionTaskPayload, PipelineError> {
    serde_json::from_value(task.payload.clone()).map_err(|e| {
        PipelineError::Validation(format!("task {} carries an unreadable payload: {e}", task.id))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use reelgen_db::models::status::TaskStatus;
    use uuid::Uuid;

    fn revision_task(payload: serde_json::Value) -> Task {
        Task {
            id: Uuid::new_v4(),
            kind: TaskKind::ProcessRevision,
            video_id: Uuid::new_v4(),
            payload,
            status: TaskStatus::Running,
            attempts: 1,
            max_attempts: 2,
            last_error: None,
            run_at: Utc::now(),
            claimed_at: Some(Utc::now()),
            completed_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn well_formed_payload_parses() {
        let revision_id = Uuid::new_v4();
        let new_video_id = Uuid::new_v4();
        let task = revision_task(serde_json::json!({
            "revision_id": revision_id,
            "request_text": "make scene 2 brighter",
            "new_video_id": new_video_id,
        }));

        let payload = parse_revision_payload(&task).unwrap();
        assert_eq!(payload.revision_id, revision_id);
        assert_eq!(payload.new_video_id, new_video_id);
    }

    #[test]
    fn garbage_payload_is_a_terminal_validation_error() {
        let task = revision_task(serde_json::json!({ "revision_id": "not-a-uuid" }));

        let err = parse_revision_payload(&task).unwrap_err();
        assert!(matches!(err, PipelineError::Validation(_)));
        assert!(!err.is_retryable());
    }
}
