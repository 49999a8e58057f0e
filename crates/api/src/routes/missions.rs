//! Route definitions for the `/missions` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::missions;
use crate::state::AppState;

/// Routes mounted at `/missions`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(missions::list).post(missions::create))
        .route(
            "/{id}",
            get(missions::get_by_id)
                .patch(missions::update)
                .delete(missions::delete),
        )
        .route("/{id}/assign", post(missions::assign))
        .route("/{id}/start", post(missions::start))
        .route("/{id}/complete", post(missions::complete))
        .route("/{id}/fail", post(missions::fail))
        .route("/{id}/cancel", post(missions::cancel))
}
