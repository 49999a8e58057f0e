//! End-to-end runs of the walkthrough against an in-process mock API.

mod common;

use axum::http::StatusCode;
use common::{closed_address, project_dir, spawn_mock, test_config, MockOptions, MOCK_TOKEN};
use robofleet_demo::console::Console;
use robofleet_demo::scenario::{self, DemoSummary, RunIdentity, DEMO_PASSWORD};
use robofleet_demo::DemoError;

async fn run_demo(
    api_url: &str,
    workdir: &std::path::Path,
) -> (Result<DemoSummary, DemoError>, String) {
    let config = test_config(api_url);
    let mut console = Console::non_interactive(Vec::new());
    let result = scenario::run(&config, workdir, RunIdentity::at(1_700_000_000), &mut console).await;
    let output = String::from_utf8(console.into_inner()).unwrap();
    (result, output)
}

#[tokio::test]
async fn missing_marker_stops_before_any_request() {
    let (api_url, mock) = spawn_mock(MockOptions::default()).await;
    let empty = tempfile::tempdir().unwrap();

    let (result, output) = run_demo(&api_url, empty.path()).await;

    assert!(matches!(result, Err(DemoError::MarkerMissing { .. })));
    assert!(mock.labels().is_empty());
    assert!(output.contains("project root"));
}

#[tokio::test]
async fn failed_liveness_check_stops_before_register() {
    let (api_url, mock) = spawn_mock(MockOptions {
        docs_status: StatusCode::SERVICE_UNAVAILABLE,
        ..Default::default()
    })
    .await;
    let dir = project_dir();

    let (result, output) = run_demo(&api_url, dir.path()).await;

    assert!(matches!(result, Err(DemoError::ApiUnreachable { .. })));
    assert_eq!(mock.labels(), vec!["GET /docs"]);
    assert!(output.contains("docker compose up -d"));
}

#[tokio::test]
async fn unreachable_api_is_a_precondition_failure() {
    let addr = closed_address().await;
    let dir = project_dir();

    let (result, _) = run_demo(&format!("http://{addr}"), dir.path()).await;

    assert!(matches!(result, Err(DemoError::ApiUnreachable { .. })));
}

#[tokio::test]
async fn successful_run_issues_calls_in_order() {
    let (api_url, mock) = spawn_mock(MockOptions::default()).await;
    let dir = project_dir();

    let (result, _) = run_demo(&api_url, dir.path()).await;
    let summary = result.expect("demo should complete");

    assert_eq!(
        mock.labels(),
        vec![
            "GET /docs",
            "POST /api/v1/auth/register",
            "POST /api/v1/auth/login",
            "POST /api/v1/robots",
            "POST /api/v1/robots",
            "POST /api/v1/robots",
            "GET /api/v1/robots",
            "POST /api/v1/missions",
            "POST /api/v1/missions",
            "POST /api/v1/missions/{id}/assign",
            "PATCH /api/v1/robots/{id}/status",
            "POST /api/v1/missions/{id}/start",
            "POST /api/v1/missions/{id}/complete",
            "PATCH /api/v1/robots/{id}/status",
            "POST /api/v1/tasks/fleet-health-check",
            "GET /api/v1/robots",
            "GET /api/v1/missions",
        ]
    );
    assert_eq!(summary.robot_ids.len(), 3);
    assert_eq!(summary.mission_ids.len(), 2);
}

#[tokio::test]
async fn only_register_and_login_are_unauthenticated() {
    let (api_url, mock) = spawn_mock(MockOptions::default()).await;
    let dir = project_dir();

    run_demo(&api_url, dir.path()).await.0.unwrap();

    let expected = format!("Bearer {MOCK_TOKEN}");
    for call in mock.calls() {
        match call.path.as_str() {
            "/docs" | "/api/v1/auth/register" | "/api/v1/auth/login" => {
                assert!(call.authorization.is_none(), "{} sent a token", call.label());
            }
            _ => assert_eq!(call.authorization.as_deref(), Some(expected.as_str()), "{}", call.label()),
        }
    }
}

#[tokio::test]
async fn login_is_form_encoded_with_generated_email() {
    let (api_url, mock) = spawn_mock(MockOptions::default()).await;
    let dir = project_dir();

    run_demo(&api_url, dir.path()).await.0.unwrap();

    let login = mock
        .calls()
        .into_iter()
        .find(|c| c.path == "/api/v1/auth/login")
        .unwrap();
    assert!(login.body.contains("username=demo-1700000000%40robofleet.dev"));
    assert!(login.body.contains("password="));
}

#[tokio::test]
async fn failed_elevation_only_warns() {
    let (api_url, mock) = spawn_mock(MockOptions::default()).await;
    let dir = project_dir();

    let (result, output) = run_demo(&api_url, dir.path()).await;
    let summary = result.unwrap();

    assert!(summary.elevated_via.is_none());
    assert!(output.contains("[warn] Could not update the role"));
    assert_eq!(mock.labels().last().unwrap(), "GET /api/v1/missions");
}

#[tokio::test]
async fn summary_shows_credentials_and_token_prefix() {
    let (api_url, _mock) = spawn_mock(MockOptions::default()).await;
    let dir = project_dir();

    let (result, output) = run_demo(&api_url, dir.path()).await;
    let summary = result.unwrap();

    let prefix: String = MOCK_TOKEN.chars().take(50).collect();
    assert_eq!(summary.token_prefix, prefix);
    assert_eq!(summary.email, "demo-1700000000@robofleet.dev");
    assert!(output.contains("Email:    demo-1700000000@robofleet.dev"));
    assert!(output.contains(&format!("Password: {DEMO_PASSWORD}")));
    assert!(output.contains(&format!("Token:    {prefix}...")));
    assert!(!output.contains(MOCK_TOKEN));
}

#[tokio::test]
async fn missing_id_field_is_fatal() {
    let (api_url, mock) = spawn_mock(MockOptions {
        omit_robot_id: true,
        ..Default::default()
    })
    .await;
    let dir = project_dir();

    let (result, _) = run_demo(&api_url, dir.path()).await;

    assert!(matches!(result, Err(DemoError::MissingField { field: "id", .. })));
    assert_eq!(mock.labels().last().unwrap(), "POST /api/v1/robots");
    assert!(!mock.labels().iter().any(|l| l.contains("missions")));
}

#[tokio::test]
async fn non_array_robot_list_shows_unknown_count() {
    let (api_url, _mock) = spawn_mock(MockOptions {
        robots_list_body: Some("{\"items\": []}".to_string()),
        ..Default::default()
    })
    .await;
    let dir = project_dir();

    let (result, output) = run_demo(&api_url, dir.path()).await;

    result.unwrap();
    assert!(output.contains("Robots in fleet: unknown"));
}

#[tokio::test]
async fn websocket_endpoints_are_printed() {
    let (api_url, _mock) = spawn_mock(MockOptions::default()).await;
    let dir = project_dir();

    let (result, output) = run_demo(&api_url, dir.path()).await;
    let summary = result.unwrap();

    let ws = api_url.replacen("http://", "ws://", 1);
    assert!(output.contains(&format!("{ws}/ws/robots/{}?token=<token>", summary.robot_ids[0])));
    assert!(output.contains(&format!("{ws}/ws/fleet?token=<token>")));
}
