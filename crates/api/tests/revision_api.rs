//! Integration tests for revision intake and history endpoints.
//!
//! Intake is the only part of the revision flow the API owns: the gate on
//! a completed video, the recorded revision row, and the enqueued task.
//! Regeneration itself happens in the worker and is tested there.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, post_json};
use reelgen_db::models::task::{RevisionTaskPayload, TaskKind};
use reelgen_db::repositories::{TaskRepo, VideoRepo};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

/// Create a video through the API, drain its intake task, and mark it
/// completed, leaving it eligible for revision.
async fn completed_video(app: &axum::Router, pool: &PgPool) -> Uuid {
    let body = json!({
        "user_id": "user-1",
        "chat_id": "chat-1",
        "prompt": "A 30 second ad for a smart water bottle",
        "image_url": "https://cdn.example/source.png",
    });
    let response = post_json(app.clone(), "/api/v1/videos", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let video_id: Uuid = json["data"]["id"].as_str().unwrap().parse().unwrap();

    let task = TaskRepo::claim_next(pool).await.unwrap().unwrap();
    TaskRepo::complete(pool, task.id).await.unwrap();

    VideoRepo::set_completed(pool, video_id, "https://cdn.example/final.mp4")
        .await
        .unwrap();

    video_id
}

// ---------------------------------------------------------------------------
// Test: intake on a completed video records and enqueues the revision
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn intake_records_and_enqueues_the_revision(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let video_id = completed_video(&app, &pool).await;

    let response = post_json(
        app.clone(),
        &format!("/api/v1/videos/{video_id}/revisions"),
        json!({
            "revision_request": "Make scene 2 warmer and slower",
            "target_scene_number": 2,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["revision_type"], "scene_specific");
    assert_eq!(body["data"]["target_scene_number"], 2);
    let revision_id: Uuid = body["data"]["id"].as_str().unwrap().parse().unwrap();

    // The video is flipped out of `completed` while the revision is queued.
    let response = get(app, &format!("/api/v1/videos/{video_id}/status")).await;
    let status = body_json(response).await;
    assert_eq!(status["data"]["status"], "revision_requested");

    // The queued task carries the revision and a fresh deliverable ID.
    let task = TaskRepo::claim_next(&pool)
        .await
        .unwrap()
        .expect("a revision task should be claimable");
    assert_eq!(task.kind, TaskKind::ProcessRevision);
    assert_eq!(task.video_id, video_id);

    let payload: RevisionTaskPayload = serde_json::from_value(task.payload).unwrap();
    assert_eq!(payload.revision_id, revision_id);
    assert_eq!(payload.request_text, "Make scene 2 warmer and slower");
    assert_ne!(payload.new_video_id, video_id);
}

// ---------------------------------------------------------------------------
// Test: a request with no scene target is classified as general
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn untargeted_request_is_general(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let video_id = completed_video(&app, &pool).await;

    let response = post_json(
        app,
        &format!("/api/v1/videos/{video_id}/revisions"),
        json!({ "revision_request": "Swap the music for something calmer" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["data"]["revision_type"], "general");
    assert!(body["data"]["target_scene_number"].is_null());
}

// ---------------------------------------------------------------------------
// Test: intake is refused while the video is not completed
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn intake_on_an_unfinished_video_is_a_conflict(pool: PgPool) {
    let app = common::build_test_app(pool.clone());

    // Freshly created: still pending.
    let body = json!({
        "user_id": "user-1",
        "prompt": "An ad",
        "image_url": "https://cdn.example/source.png",
    });
    let response = post_json(app.clone(), "/api/v1/videos", body).await;
    let created = body_json(response).await;
    let video_id: Uuid = created["data"]["id"].as_str().unwrap().parse().unwrap();

    let response = post_json(
        app,
        &format!("/api/v1/videos/{video_id}/revisions"),
        json!({ "revision_request": "Different music" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["code"], "CONFLICT");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn second_intake_while_one_is_queued_is_a_conflict(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let video_id = completed_video(&app, &pool).await;

    let first = post_json(
        app.clone(),
        &format!("/api/v1/videos/{video_id}/revisions"),
        json!({ "revision_request": "Brighter colors" }),
    )
    .await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = post_json(
        app,
        &format!("/api/v1/videos/{video_id}/revisions"),
        json!({ "revision_request": "Louder narration" }),
    )
    .await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

// ---------------------------------------------------------------------------
// Test: validation and missing-video errors
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn scene_target_outside_the_script_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let video_id = completed_video(&app, &pool).await;

    let response = post_json(
        app,
        &format!("/api/v1/videos/{video_id}/revisions"),
        json!({ "revision_request": "Fix scene nine", "target_scene_number": 9 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");

    // The gate never ran: the video is still completed.
    let video = VideoRepo::find_by_id(&pool, video_id).await.unwrap().unwrap();
    assert_eq!(video.status.as_str(), "completed");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn intake_against_a_missing_video_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(
        app,
        &format!("/api/v1/videos/{}/revisions", Uuid::new_v4()),
        json!({ "revision_request": "Different music" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: history listing and single-revision fetch
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn history_lists_and_fetches_revisions(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let video_id = completed_video(&app, &pool).await;

    let response = post_json(
        app.clone(),
        &format!("/api/v1/videos/{video_id}/revisions"),
        json!({ "revision_request": "Warmer grade", "target_scene_number": 1 }),
    )
    .await;
    let created = body_json(response).await;
    let revision_id: Uuid = created["data"]["id"].as_str().unwrap().parse().unwrap();

    let response = get(app.clone(), &format!("/api/v1/videos/{video_id}/revisions")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let listing = body_json(response).await;
    let rows = listing["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], revision_id.to_string());

    let response = get(
        app.clone(),
        &format!("/api/v1/videos/{video_id}/revisions/{revision_id}"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // The same revision under a different video is a 404.
    let other = completed_video(&app, &pool).await;
    let response = get(
        app,
        &format!("/api/v1/videos/{other}/revisions/{revision_id}"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
