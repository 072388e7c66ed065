pub mod health;
pub mod videos;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /videos                                    create, list (POST, GET)
/// /videos/{id}                               get with scenes + music, delete
/// /videos/{id}/status                        status + stage progress (GET)
/// /videos/{id}/retry                         re-run a failed video (POST)
/// /videos/{id}/revisions                     request, list (POST, GET)
/// /videos/{id}/revisions/{revision_id}       get one revision (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Video lifecycle and revision intake.
        .nest("/videos", videos::router())
}
