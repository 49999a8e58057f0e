pub mod auth;
pub mod health;
pub mod missions;
pub mod robots;
pub mod tasks;
pub mod ws;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                       register (public)
/// /auth/login                          login, form-encoded (public)
/// /auth/me                             current user
/// /auth/users/{id}                     deactivate (admin)
/// /auth/users/{id}/role                change role (admin)
///
/// /robots                              list, create
/// /robots/{id}                         get, update, delete
/// /robots/{id}/status                  status + telemetry report
///
/// /missions                            list (?status=&robot_id=), create
/// /missions/{id}                       get, update, delete
/// /missions/{id}/assign                assign a robot
/// /missions/{id}/start                 lifecycle actions
/// /missions/{id}/complete
/// /missions/{id}/fail
/// /missions/{id}/cancel
///
/// /tasks/fleet-health-check            queue a health check
/// /tasks/process-scheduled-missions    queue scheduled mission processing
/// /tasks/{task_id}                     run status
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/robots", robots::router())
        .nest("/missions", missions::router())
        .nest("/tasks", tasks::router())
}
