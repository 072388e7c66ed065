//! Route definitions for the video lifecycle and revision intake.
//!
//! Mounted at `/videos`. Revisions are scoped under their video.
//!
//! ```text
//! POST   /                                  create_video
//! GET    /                                  list_videos
//! GET    /{id}                              get_video
//! DELETE /{id}                              delete_video
//! GET    /{id}/status                       get_video_status
//! POST   /{id}/retry                        retry_video
//! POST   /{id}/revisions                    request_revision
//! GET    /{id}/revisions                    list_revisions
//! GET    /{id}/revisions/{revision_id}      get_revision
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{revisions, videos};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(videos::create_video).get(videos::list_videos))
        .route("/{id}", get(videos::get_video).delete(videos::delete_video))
        .route("/{id}/status", get(videos::get_video_status))
        .route("/{id}/retry", post(videos::retry_video))
        .route(
            "/{id}/revisions",
            post(revisions::request_revision).get(revisions::list_revisions),
        )
        .route(
            "/{id}/revisions/{revision_id}",
            get(revisions::get_revision),
        )
}
