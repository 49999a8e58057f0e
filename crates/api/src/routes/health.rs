//! Root-level service routes: `/`, `/health` and `/docs`.

use axum::extract::State;
use axum::response::Html;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Service banner returned by `GET /`.
#[derive(Serialize)]
pub struct RootResponse {
    pub name: String,
    pub version: &'static str,
    pub docs: &'static str,
}

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the database is reachable.
    pub db_healthy: bool,
}

/// Every public endpoint, rendered by `/docs`.
const ROUTES: &[(&str, &str, &str)] = &[
    ("GET", "/health", "Service and database health"),
    ("POST", "/api/v1/auth/register", "Register a viewer account"),
    ("POST", "/api/v1/auth/login", "Form login, returns a bearer token"),
    ("GET", "/api/v1/auth/me", "Current user"),
    ("PATCH", "/api/v1/auth/users/{id}/role", "Change a user's role (admin)"),
    ("DELETE", "/api/v1/auth/users/{id}", "Deactivate a user (admin)"),
    ("GET", "/api/v1/robots", "List robots (?skip=&limit=)"),
    ("POST", "/api/v1/robots", "Register a robot (operator)"),
    ("GET", "/api/v1/robots/{id}", "Get a robot"),
    ("PATCH", "/api/v1/robots/{id}", "Update robot details (operator)"),
    ("PATCH", "/api/v1/robots/{id}/status", "Report status and telemetry (operator)"),
    ("DELETE", "/api/v1/robots/{id}", "Delete a robot (operator)"),
    ("GET", "/api/v1/missions", "List missions (?status=&robot_id=&skip=&limit=)"),
    ("POST", "/api/v1/missions", "Create a mission (operator)"),
    ("GET", "/api/v1/missions/{id}", "Get a mission"),
    ("PATCH", "/api/v1/missions/{id}", "Update a mission (operator)"),
    ("DELETE", "/api/v1/missions/{id}", "Delete a mission (operator)"),
    ("POST", "/api/v1/missions/{id}/assign", "Assign a robot (operator)"),
    ("POST", "/api/v1/missions/{id}/start", "Start (operator)"),
    ("POST", "/api/v1/missions/{id}/complete", "Complete (operator)"),
    ("POST", "/api/v1/missions/{id}/fail", "Fail (operator)"),
    ("POST", "/api/v1/missions/{id}/cancel", "Cancel (operator)"),
    ("POST", "/api/v1/tasks/fleet-health-check", "Queue a fleet health check (operator)"),
    ("POST", "/api/v1/tasks/process-scheduled-missions", "Queue scheduled mission processing (operator)"),
    ("GET", "/api/v1/tasks/{task_id}", "Task run status"),
    ("GET", "/ws/robots/{robot_id}?token=", "WebSocket: one robot's updates"),
    ("GET", "/ws/fleet?token=", "WebSocket: fleet-wide updates"),
];

/// GET / -- service name, version and docs location.
async fn root(State(state): State<AppState>) -> Json<RootResponse> {
    Json(RootResponse {
        name: state.config.app_name.clone(),
        version: env!("CARGO_PKG_VERSION"),
        docs: "/docs",
    })
}

/// GET /health -- returns service and database health.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = robofleet_db::health_check(&state.pool).await.is_ok();

    let status = if db_healthy { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
    })
}

/// GET /docs -- static HTML route reference.
async fn docs(State(state): State<AppState>) -> Html<String> {
    Html(render_docs(&state.config.app_name))
}

fn render_docs(app_name: &str) -> String {
    let rows: String = ROUTES
        .iter()
        .map(|(method, path, summary)| {
            format!("<tr><td><code>{method}</code></td><td><code>{path}</code></td><td>{summary}</td></tr>\n")
        })
        .collect();
    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>{app_name} API</title></head>\n\
         <body><h1>{app_name} API v{}</h1>\n\
         <p>Authenticate with <code>Authorization: Bearer &lt;token&gt;</code>; \
         WebSocket streams take <code>?token=</code>.</p>\n\
         <table>\n<tr><th>Method</th><th>Path</th><th>Description</th></tr>\n{rows}</table>\n\
         </body></html>\n",
        env!("CARGO_PKG_VERSION"),
    )
}

/// Mount root-level routes (NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/docs", get(docs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn docs_list_every_route() {
        let html = render_docs("RoboFleet");
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>RoboFleet API</title>"));
        for (_, path, _) in ROUTES {
            assert!(html.contains(path), "missing {path}");
        }
    }
}
