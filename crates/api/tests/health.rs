//! Integration tests for the root-level routes and general HTTP behaviour.
//!
//! Database-backed: `#[sqlx::test]` needs a PostgreSQL `DATABASE_URL`.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{body_json, get};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

#[sqlx::test(migrations = "../db/migrations")]
async fn health_check_returns_ok_with_json(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["db_healthy"], true);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn root_reports_name_and_docs(pool: PgPool) {
    let app = common::build_test_app(pool);
    let json = body_json(get(app, "/").await).await;

    assert_eq!(json["name"], "RoboFleet");
    assert_eq!(json["docs"], "/docs");
    assert!(json["version"].is_string());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn docs_page_is_html(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/docs").await;

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/html"));

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("/api/v1/missions/{id}/assign"));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_route_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/this-route-does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn response_contains_x_request_id_header(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/health").await;

    let request_id = response
        .headers()
        .get("x-request-id")
        .expect("Response must contain an x-request-id header");
    assert_eq!(request_id.to_str().unwrap().len(), 36);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn cors_preflight_returns_correct_headers(pool: PgPool) {
    let app = common::build_test_app(pool);

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/v1/robots")
        .header("Origin", "http://localhost:3000")
        .header("Access-Control-Request-Method", "GET")
        .header("Access-Control-Request-Headers", "authorization")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let allow_origin = response
        .headers()
        .get("access-control-allow-origin")
        .expect("Missing Access-Control-Allow-Origin header");
    assert_eq!(allow_origin, "http://localhost:3000");
}

// ---------------------------------------------------------------------------
// WebSocket handshakes without a valid token are refused before upgrade
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn fleet_stream_without_token_is_401(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/ws/fleet").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn robot_stream_with_bad_token_is_401(pool: PgPool) {
    let app = common::build_test_app(pool);
    let uri = format!("/ws/robots/{}?token=garbage", uuid::Uuid::new_v4());
    let response = get(app, &uri).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(response).await["detail"],
        "Could not validate credentials"
    );
}

// ---------------------------------------------------------------------------
// Middleware stack, no database needed
// ---------------------------------------------------------------------------

/// `/` never touches the pool, so a lazy pool with no server behind it is fine.
fn app_without_database() -> axum::Router {
    let pool = sqlx::postgres::PgPoolOptions::new()
        .connect_lazy("postgres://robofleet@127.0.0.1:1/unused")
        .unwrap();
    common::build_test_app(pool)
}

#[tokio::test]
async fn every_layer_applies_to_a_plain_request() {
    let request = Request::builder()
        .uri("/")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();

    let response = app_without_database().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "http://localhost:3000"
    );
    assert_eq!(body_json(response).await["name"], "RoboFleet");
}

#[tokio::test]
async fn caller_request_id_is_echoed() {
    let request = Request::builder()
        .uri("/")
        .header("x-request-id", "demo-run-42")
        .body(Body::empty())
        .unwrap();

    let response = app_without_database().oneshot(request).await.unwrap();

    assert_eq!(response.headers()["x-request-id"], "demo-run-42");
}
