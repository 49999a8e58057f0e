//! JWT-based authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use robofleet_core::error::CoreError;
use robofleet_db::models::user::User;
use robofleet_db::repositories::UserRepo;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Authenticated user extracted from a JWT Bearer token in the `Authorization` header.
///
/// The user row is loaded fresh on every request, so role changes and
/// deactivation take effect without waiting for the token to expire.
///
/// ```ignore
/// async fn my_handler(AuthUser(user): AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = %user.id, role = %user.role, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| AppError::Core(CoreError::Unauthorized("Not authenticated".into())))?;

        authenticate(state, token).await.map(AuthUser)
    }
}

/// Resolve a raw access token to an active user.
///
/// Shared by the header extractor and the WebSocket `?token=` check.
pub async fn authenticate(state: &AppState, token: &str) -> AppResult<User> {
    let invalid = || AppError::Core(CoreError::Unauthorized("Could not validate credentials".into()));

    let claims = state.config.jwt.verify(token).map_err(|_| invalid())?;

    let user = UserRepo::find_by_id(&state.pool, claims.sub)
        .await?
        .ok_or_else(invalid)?;

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden("Inactive user".into())));
    }
    Ok(user)
}
