//! Handlers for the `/videos/{id}/revisions` resource.
//!
//! Revision intake is gated on the video being `completed`: the gate and
//! the status flip to `revision_requested` are one conditional UPDATE, so
//! two concurrent requests cannot both pass. The accepted request is
//! recorded, given a fresh video ID for the revised deliverable, and
//! enqueued for the worker.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use reelgen_core::error::CoreError;
use reelgen_core::script::{is_valid_scene_number, SCENE_COUNT};
use reelgen_core::types::DbId;
use reelgen_db::models::revision::CreateRevision;
use reelgen_db::models::task::RevisionTaskPayload;
use reelgen_db::repositories::{RevisionRepo, TaskRepo, VideoRepo};
use reelgen_events::PipelineEvent;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Upper bound on revision request length, in characters.
const MAX_REQUEST_CHARS: usize = 2000;

/// Revision classification for a request that names a scene.
const TYPE_SCENE_SPECIFIC: &str = "scene_specific";

/// Revision classification for a request with no scene target.
const TYPE_GENERAL: &str = "general";

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Body for `POST /videos/{id}/revisions`.
#[derive(Debug, Deserialize)]
pub struct RequestRevisionBody {
    /// Free-text description of the wanted changes.
    pub revision_request: String,
    /// Optional 1-based scene the request is about.
    pub target_scene_number: Option<i32>,
}

/// Validate a revision request body.
fn validate_request(body: &RequestRevisionBody) -> AppResult<()> {
    if body.revision_request.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "revision_request is required".to_string(),
        )));
    }
    if body.revision_request.chars().count() > MAX_REQUEST_CHARS {
        return Err(AppError::Core(CoreError::Validation(format!(
            "revision_request must be at most {MAX_REQUEST_CHARS} characters"
        ))));
    }
    if let Some(n) = body.target_scene_number {
        if !is_valid_scene_number(n) {
            return Err(AppError::Core(CoreError::Validation(format!(
                "target_scene_number must be between 1 and {SCENE_COUNT}"
            ))));
        }
    }
    Ok(())
}

/// POST /api/v1/videos/{id}/revisions
///
/// Request a revision of a completed video. Flips the video to
/// `revision_requested`, records the revision, and enqueues a revision task
/// carrying a fresh video ID for the revised deliverable. Returns 201 with
/// the pending revision, or 409 when the video is not `completed`.
pub async fn request_revision(
    State(state): State<AppState>,
    Path(video_id): Path<DbId>,
    Json(body): Json<RequestRevisionBody>,
) -> AppResult<impl IntoResponse> {
    validate_request(&body)?;

    let video = VideoRepo::find_by_id(&state.pool, video_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Video",
            id: video_id,
        }))?;

    let accepted = VideoRepo::request_revision(&state.pool, video_id).await?;
    if !accepted {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Only completed videos can be revised (current status: {})",
            video.status
        ))));
    }

    let revision_type = match body.target_scene_number {
        Some(_) => TYPE_SCENE_SPECIFIC,
        None => TYPE_GENERAL,
    };
    let revision = RevisionRepo::create(
        &state.pool,
        &CreateRevision {
            video_id,
            revision_request: body.revision_request.clone(),
            revision_type: Some(revision_type.to_string()),
            target_scene_number: body.target_scene_number,
        },
    )
    .await?;

    // The revised deliverable gets its own ID so callbacks can tell it
    // apart from the original video.
    let new_video_id = Uuid::new_v4();
    let task = TaskRepo::enqueue_revision(
        &state.pool,
        video_id,
        &RevisionTaskPayload {
            revision_id: revision.id,
            request_text: body.revision_request,
            new_video_id,
        },
    )
    .await?;

    state.event_bus.publish(
        PipelineEvent::new("revision.requested")
            .for_video(video_id)
            .with_payload(json!({
                "revision_id": revision.id,
                "task_id": task.id,
                "new_video_id": new_video_id,
            })),
    );

    tracing::info!(
        video_id = %video_id,
        revision_id = %revision.id,
        task_id = %task.id,
        revision_type,
        "Revision request accepted",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: revision })))
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

/// GET /api/v1/videos/{id}/revisions
///
/// List a video's revision history, newest first.
pub async fn list_revisions(
    State(state): State<AppState>,
    Path(video_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if VideoRepo::find_by_id(&state.pool, video_id).await?.is_none() {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Video",
            id: video_id,
        }));
    }

    let revisions = RevisionRepo::list_by_video(&state.pool, video_id).await?;
    Ok(Json(DataResponse { data: revisions }))
}

// ---------------------------------------------------------------------------
// Get
// ---------------------------------------------------------------------------

/// GET /api/v1/videos/{id}/revisions/{revision_id}
///
/// Get a single revision. A revision belonging to a different video is a
/// 404.
pub async fn get_revision(
    State(state): State<AppState>,
    Path((video_id, revision_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let revision = RevisionRepo::find_by_id(&state.pool, revision_id)
        .await?
        .filter(|r| r.video_id == video_id)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Revision",
            id: revision_id,
        }))?;

    Ok(Json(DataResponse { data: revision }))
}
