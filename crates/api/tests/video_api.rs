//! Integration tests for the video lifecycle endpoints.
//!
//! Each test drives the full router against a fresh database. Pipeline
//! stages never run here; rows are moved between statuses through the
//! repository layer where a test needs a video past intake.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete, get, post_json};
use reelgen_db::models::status::VideoStatus;
use reelgen_db::models::task::TaskKind;
use reelgen_db::repositories::{TaskRepo, VideoRepo};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

/// A well-formed intake body.
fn intake_body(user_id: &str) -> serde_json::Value {
    json!({
        "user_id": user_id,
        "chat_id": "chat-1",
        "prompt": "A 30 second ad for a smart water bottle",
        "image_url": "https://cdn.example/source.png",
    })
}

/// POST a video through the API and return its ID.
async fn create_video(app: &axum::Router, pool: &PgPool, user_id: &str) -> Uuid {
    let response = post_json(app.clone(), "/api/v1/videos", intake_body(user_id)).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    let id: Uuid = json["data"]["id"].as_str().unwrap().parse().unwrap();

    // Sanity: the row exists.
    assert!(VideoRepo::find_by_id(pool, id).await.unwrap().is_some());
    id
}

// ---------------------------------------------------------------------------
// Test: create returns 201, a pending row, and a claimable generation task
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_returns_pending_row_and_enqueues_generation(pool: PgPool) {
    let app = common::build_test_app(pool.clone());

    let response = post_json(app, "/api/v1/videos", intake_body("user-1")).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "pending");
    assert_eq!(json["data"]["user_id"], "user-1");
    assert!(json["data"]["final_video_url"].is_null());

    let video_id: Uuid = json["data"]["id"].as_str().unwrap().parse().unwrap();

    let task = TaskRepo::claim_next(&pool)
        .await
        .unwrap()
        .expect("a generation task should be claimable");
    assert_eq!(task.kind, TaskKind::GenerateVideo);
    assert_eq!(task.video_id, video_id);
}

// ---------------------------------------------------------------------------
// Test: intake validation failures return 400 before any row is written
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn blank_prompt_is_rejected_with_400(pool: PgPool) {
    let app = common::build_test_app(pool.clone());

    let mut body = intake_body("user-1");
    body["prompt"] = json!("   ");
    let response = post_json(app, "/api/v1/videos", body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");

    // Nothing was enqueued.
    assert!(TaskRepo::claim_next(&pool).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn non_http_image_url_is_rejected_with_400(pool: PgPool) {
    let app = common::build_test_app(pool);

    let mut body = intake_body("user-1");
    body["image_url"] = json!("file:///etc/passwd");
    let response = post_json(app, "/api/v1/videos", body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

// ---------------------------------------------------------------------------
// Test: get returns the video with empty scenes and no music before any run
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn get_includes_scenes_and_music(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let video_id = create_video(&app, &pool, "user-1").await;

    let response = get(app, &format!("/api/v1/videos/{video_id}")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["id"], video_id.to_string());
    assert_eq!(json["data"]["prompt"], "A 30 second ad for a smart water bottle");
    assert_eq!(json["data"]["scenes"], json!([]));
    assert!(json["data"]["music"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn get_missing_video_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get(app, &format!("/api/v1/videos/{}", Uuid::new_v4())).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
}

// ---------------------------------------------------------------------------
// Test: status endpoint reports stage progress as the pipeline advances
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn status_reports_stage_progress(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let video_id = create_video(&app, &pool, "user-1").await;

    let response = get(app.clone(), &format!("/api/v1/videos/{video_id}/status")).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "pending");
    assert_eq!(json["data"]["progress"]["current"], 0);
    assert_eq!(json["data"]["progress"]["total"], 7);

    VideoRepo::set_status(&pool, video_id, VideoStatus::GeneratingScenes)
        .await
        .unwrap();

    let response = get(app, &format!("/api/v1/videos/{video_id}/status")).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "generating_scenes");
    assert_eq!(json["data"]["progress"]["current"], 3);
}

// ---------------------------------------------------------------------------
// Test: listing filters by user and status
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_filters_by_user_and_status(pool: PgPool) {
    let app = common::build_test_app(pool.clone());

    let first = create_video(&app, &pool, "user-a").await;
    let _second = create_video(&app, &pool, "user-a").await;
    let _other = create_video(&app, &pool, "user-b").await;

    VideoRepo::set_failed(&pool, first, "clip synthesis failed")
        .await
        .unwrap();

    let response = get(app.clone(), "/api/v1/videos?user_id=user-a").await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);

    let response = get(app, "/api/v1/videos?user_id=user-a&status=failed").await;
    let json = body_json(response).await;
    let rows = json["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], first.to_string());
}

// ---------------------------------------------------------------------------
// Test: retry is gated on failed status and re-enqueues generation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn retry_requires_failed_status(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let video_id = create_video(&app, &pool, "user-1").await;

    // Still pending: retry must be refused.
    let response = post_json(
        app.clone(),
        &format!("/api/v1/videos/{video_id}/retry"),
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["code"], "CONFLICT");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn retry_resets_a_failed_video_and_enqueues(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let video_id = create_video(&app, &pool, "user-1").await;

    // Drain the intake task so the retry's task is the only one left.
    let intake_task = TaskRepo::claim_next(&pool).await.unwrap().unwrap();
    TaskRepo::complete(&pool, intake_task.id).await.unwrap();

    VideoRepo::set_failed(&pool, video_id, "voiceover synthesis failed")
        .await
        .unwrap();

    let response = post_json(
        app,
        &format!("/api/v1/videos/{video_id}/retry"),
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "pending");
    assert!(json["data"]["error_message"].is_null());

    let task = TaskRepo::claim_next(&pool)
        .await
        .unwrap()
        .expect("retry should enqueue a fresh generation task");
    assert_eq!(task.kind, TaskKind::GenerateVideo);
    assert_eq!(task.video_id, video_id);
}

// ---------------------------------------------------------------------------
// Test: delete removes the video and is a 404 the second time
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_removes_the_video(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let video_id = create_video(&app, &pool, "user-1").await;

    let response = delete(app.clone(), &format!("/api/v1/videos/{video_id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(app.clone(), &format!("/api/v1/videos/{video_id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = delete(app, &format!("/api/v1/videos/{video_id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Queued tasks went with the video.
    assert!(TaskRepo::claim_next(&pool).await.unwrap().is_none());
}
