//! Route definitions for the `/auth` resource.

use axum::routing::{delete, get, patch, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/me", get(auth::me))
        .route("/users/{id}", delete(auth::deactivate))
        .route("/users/{id}/role", patch(auth::update_role))
}
