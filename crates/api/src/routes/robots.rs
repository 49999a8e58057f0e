//! Route definitions for the `/robots` resource.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::robots;
use crate::state::AppState;

/// Routes mounted at `/robots`.
///
/// ```text
/// GET    /              -> list
/// POST   /              -> create
/// GET    /{id}          -> get_by_id
/// PATCH  /{id}          -> update
/// DELETE /{id}          -> delete
/// PATCH  /{id}/status   -> update_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(robots::list).post(robots::create))
        .route(
            "/{id}",
            get(robots::get_by_id)
                .patch(robots::update)
                .delete(robots::delete),
        )
        .route("/{id}/status", patch(robots::update_status))
}
