//! Authentication route handlers.
//!
//! JSON API: register, login, logout, and current-user lookup. Successful
//! register/login rotate the session id and store a [`CurrentUser`].

use axum::{Json, extract::State};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::info;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::{CurrentUser, User};
use crate::services::AuthService;
use crate::state::AppState;

/// Request body for registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// `POST /api/auth/register`
///
/// # Errors
///
/// `400` on invalid email or weak password, `409` if the email is taken.
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<RegisterRequest>,
) -> Result<Json<User>> {
    let user = AuthService::new(state.pool())
        .register(&body.email, &body.password, body.name.as_deref())
        .await?;

    establish_session(&session, &user).await?;

    info!(user_id = %user.id, "user registered");

    Ok(Json(user))
}

/// `POST /api/auth/login`
///
/// # Errors
///
/// `401` on bad credentials.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LoginRequest>,
) -> Result<Json<User>> {
    let user = AuthService::new(state.pool())
        .login(&body.email, &body.password)
        .await?;

    establish_session(&session, &user).await?;

    info!(user_id = %user.id, "user logged in");

    Ok(Json(user))
}

/// `POST /api/auth/logout`
///
/// Always succeeds, logged in or not.
///
/// # Errors
///
/// `500` if the session store fails.
pub async fn logout(session: Session) -> Result<Json<serde_json::Value>> {
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
    session
        .flush()
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;

    clear_sentry_user();

    Ok(Json(serde_json::json!({ "ok": true })))
}

/// `GET /api/auth/me`
///
/// # Errors
///
/// `401` when not logged in, `404` if the account was deleted since login.
pub async fn me(
    State(state): State<AppState>,
    crate::middleware::RequireUser(current): crate::middleware::RequireUser,
) -> Result<Json<User>> {
    let user = AuthService::new(state.pool()).get_user(current.id).await?;

    Ok(Json(user))
}

/// Rotate the session and store the logged-in user.
async fn establish_session(session: &Session, user: &User) -> Result<()> {
    // New session id on privilege change.
    session
        .cycle_id()
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;

    set_current_user(session, &CurrentUser::from(user))
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;

    set_sentry_user(&user.id, Some(user.email.as_str()));

    Ok(())
}
