//! Handlers for the `/videos` resource.
//!
//! Intake is asynchronous: creating a video inserts a `pending` row and
//! enqueues a generation task for the worker. Handlers never run pipeline
//! stages inline.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use reelgen_core::error::CoreError;
use reelgen_core::types::DbId;
use reelgen_db::models::music::Music;
use reelgen_db::models::scene::Scene;
use reelgen_db::models::status::{Progress, VideoStatus};
use reelgen_db::models::video::{CreateVideo, Video, VideoListQuery};
use reelgen_db::repositories::{MusicRepo, SceneRepo, TaskRepo, VideoRepo};
use reelgen_events::PipelineEvent;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Upper bound on intake prompt length, in characters.
const MAX_PROMPT_CHARS: usize = 2000;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fetch a video by ID, mapping a missing row to a 404.
async fn find_video(pool: &sqlx::PgPool, video_id: DbId) -> AppResult<Video> {
    VideoRepo::find_by_id(pool, video_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Video",
            id: video_id,
        }))
}

/// Validate an intake request: caller, prompt, and a fetchable source image
/// are all required.
fn validate_intake(input: &CreateVideo) -> AppResult<()> {
    if input.user_id.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "user_id is required".to_string(),
        )));
    }
    if input.prompt.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "prompt is required".to_string(),
        )));
    }
    if input.prompt.chars().count() > MAX_PROMPT_CHARS {
        return Err(AppError::Core(CoreError::Validation(format!(
            "prompt must be at most {MAX_PROMPT_CHARS} characters"
        ))));
    }
    if !input.image_url.starts_with("http://") && !input.image_url.starts_with("https://") {
        return Err(AppError::Core(CoreError::Validation(
            "image_url must be an http(s) URL".to_string(),
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

/// POST /api/v1/videos
///
/// Accept a video request. Returns 201 with the created row in `pending`
/// status; a generation task is enqueued and the worker drives the pipeline
/// from there.
pub async fn create_video(
    State(state): State<AppState>,
    Json(input): Json<CreateVideo>,
) -> AppResult<impl IntoResponse> {
    validate_intake(&input)?;

    let video = VideoRepo::create(&state.pool, &input).await?;
    let task = TaskRepo::enqueue_generation(&state.pool, video.id).await?;

    state.event_bus.publish(
        PipelineEvent::new("video.created")
            .for_video(video.id)
            .with_payload(json!({ "task_id": task.id })),
    );

    tracing::info!(
        video_id = %video.id,
        task_id = %task.id,
        user_id = %video.user_id,
        "Video request accepted",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: video })))
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

/// Query parameters for `GET /videos`.
#[derive(Debug, Deserialize)]
pub struct ListVideosParams {
    pub user_id: String,
    pub status: Option<VideoStatus>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/v1/videos
///
/// List a user's videos, newest first. Supports optional `status`, `limit`,
/// and `offset` query parameters.
pub async fn list_videos(
    State(state): State<AppState>,
    Query(params): Query<ListVideosParams>,
) -> AppResult<impl IntoResponse> {
    let filter = VideoListQuery {
        status: params.status,
        limit: params.limit,
        offset: params.offset,
    };
    let videos = VideoRepo::list_by_user(&state.pool, &params.user_id, &filter).await?;

    Ok(Json(DataResponse { data: videos }))
}

// ---------------------------------------------------------------------------
// Get
// ---------------------------------------------------------------------------

/// A video together with its per-scene rows and music track.
#[derive(Debug, Serialize)]
pub struct VideoDetail {
    #[serde(flatten)]
    pub video: Video,
    pub scenes: Vec<Scene>,
    pub music: Option<Music>,
}

/// GET /api/v1/videos/{id}
///
/// Get a single video with its scenes (ordered by scene number) and music
/// row, when those exist yet.
pub async fn get_video(
    State(state): State<AppState>,
    Path(video_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let video = find_video(&state.pool, video_id).await?;
    let scenes = SceneRepo::list_by_video(&state.pool, video_id).await?;
    let music = MusicRepo::find_by_video(&state.pool, video_id).await?;

    Ok(Json(DataResponse {
        data: VideoDetail {
            video,
            scenes,
            music,
        },
    }))
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lightweight status view for polling clients.
#[derive(Debug, Serialize)]
pub struct VideoStatusView {
    pub id: DbId,
    pub status: VideoStatus,
    pub progress: Progress,
    pub final_video_url: Option<String>,
    pub error_message: Option<String>,
}

/// GET /api/v1/videos/{id}/status
///
/// Status poll: current lifecycle status plus which of the seven generation
/// stages is underway.
pub async fn get_video_status(
    State(state): State<AppState>,
    Path(video_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let video = find_video(&state.pool, video_id).await?;

    Ok(Json(DataResponse {
        data: VideoStatusView {
            id: video.id,
            status: video.status,
            progress: video.status.progress(),
            final_video_url: video.final_video_url,
            error_message: video.error_message,
        },
    }))
}

// ---------------------------------------------------------------------------
// Retry
// ---------------------------------------------------------------------------

/// POST /api/v1/videos/{id}/retry
///
/// Re-run a failed video. Resets `failed` -> `pending`, clears the stored
/// error, and enqueues a fresh generation task. Returns 409 when the video
/// is not in `failed` status. The new run rebuilds every stage from the
/// original prompt and image.
pub async fn retry_video(
    State(state): State<AppState>,
    Path(video_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let video = find_video(&state.pool, video_id).await?;

    let reset = VideoRepo::reset_for_retry(&state.pool, video_id).await?;
    if !reset {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Only failed videos can be retried (current status: {})",
            video.status
        ))));
    }

    let task = TaskRepo::enqueue_generation(&state.pool, video_id).await?;

    state.event_bus.publish(
        PipelineEvent::new("video.retried")
            .for_video(video_id)
            .with_payload(json!({ "task_id": task.id })),
    );

    tracing::info!(
        video_id = %video_id,
        task_id = %task.id,
        "Video retry accepted",
    );

    let video = find_video(&state.pool, video_id).await?;
    Ok(Json(DataResponse { data: video }))
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

/// DELETE /api/v1/videos/{id}
///
/// Delete a video. Scenes, music, revisions, and queued tasks cascade with
/// it; the event trail stays. Returns 204.
pub async fn delete_video(
    State(state): State<AppState>,
    Path(video_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = VideoRepo::delete(&state.pool, video_id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Video",
            id: video_id,
        }));
    }

    state
        .event_bus
        .publish(PipelineEvent::new("video.deleted").for_video(video_id));

    tracing::info!(video_id = %video_id, "Video deleted");

    Ok(StatusCode::NO_CONTENT)
}
