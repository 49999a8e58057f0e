//! Route definitions for the `/tasks` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::tasks;
use crate::state::AppState;

/// Routes mounted at `/tasks`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/fleet-health-check", post(tasks::fleet_health_check))
        .route(
            "/process-scheduled-missions",
            post(tasks::process_scheduled_missions),
        )
        .route("/{task_id}", get(tasks::get_by_id))
}
