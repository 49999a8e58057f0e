//! Handlers for the `/auth` resource (register, login, current user) and
//! admin user management.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Form, Json};
use robofleet_core::error::CoreError;
use robofleet_core::roles::UserRole;
use robofleet_core::types::DbId;
use robofleet_core::user::{validate_email, validate_full_name};
use robofleet_db::models::user::{CreateUser, UserResponse};
use robofleet_db::repositories::UserRepo;
use serde::{Deserialize, Serialize};

use crate::auth::password::{check_password_length, hash_password, password_matches};
use crate::error::{is_unique_violation, AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
}

/// Form body for `POST /auth/login`. `username` carries the email address.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

/// Request body for `PATCH /auth/users/{id}/role`.
#[derive(Debug, Deserialize)]
pub struct RoleUpdate {
    pub role: UserRole,
}

fn email_taken() -> AppError {
    AppError::BadRequest("Email already registered".into())
}

fn user_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "User", id })
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
///
/// Create a `viewer` account.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    validate_email(&input.email)?;
    validate_full_name(input.full_name.as_deref())?;
    check_password_length(&input.password)?;

    if UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .is_some()
    {
        return Err(email_taken());
    }

    let hashed_password = hash_password(&input.password)?;

    let create = CreateUser {
        email: input.email,
        hashed_password,
        full_name: input.full_name,
    };
    let user = UserRepo::create(&state.pool, &create)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, "uq_users_email") {
                email_taken()
            } else {
                AppError::Database(e)
            }
        })?;

    tracing::info!(user_id = %user.id, "User registered");
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// POST /api/v1/auth/login
///
/// Form-encoded OAuth2 password flow. Returns a bearer access token.
pub async fn login(
    State(state): State<AppState>,
    Form(input): Form<LoginForm>,
) -> AppResult<Json<TokenResponse>> {
    let rejected = || {
        AppError::Core(CoreError::Unauthorized(
            "Incorrect email or password".into(),
        ))
    };

    let user = UserRepo::find_by_email(&state.pool, &input.username)
        .await?
        .ok_or_else(rejected)?;

    if !password_matches(&input.password, &user.hashed_password)? {
        return Err(rejected());
    }

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden("Inactive user".into())));
    }

    let access_token = state
        .config
        .jwt
        .issue(user.id)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!(user_id = %user.id, "User logged in");
    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer",
    }))
}

/// GET /api/v1/auth/me
pub async fn me(AuthUser(user): AuthUser) -> Json<UserResponse> {
    Json(user.into())
}

/// PATCH /api/v1/auth/users/{id}/role (admin only)
pub async fn update_role(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<RoleUpdate>,
) -> AppResult<Json<UserResponse>> {
    let user = UserRepo::update_role(&state.pool, id, input.role)
        .await?
        .ok_or_else(|| user_not_found(id))?;

    tracing::info!(admin_id = %admin.id, user_id = %id, role = %input.role, "User role changed");
    Ok(Json(user.into()))
}

/// DELETE /api/v1/auth/users/{id} (admin only)
///
/// Deactivates the account; the row is kept.
pub async fn deactivate(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if admin.id == id {
        return Err(AppError::BadRequest("Cannot deactivate your own account".into()));
    }
    if UserRepo::deactivate(&state.pool, id).await? {
        tracing::info!(admin_id = %admin.id, user_id = %id, "User deactivated");
        return Ok(StatusCode::NO_CONTENT);
    }
    // Already inactive is not an error; a missing user is.
    match UserRepo::find_by_id(&state.pool, id).await? {
        Some(_) => Ok(StatusCode::NO_CONTENT),
        None => Err(user_not_found(id)),
    }
}
