// src/web/auth_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::user::{LoginForm, UserProfile},
    services::auth_service,
    state::AppState,
    web::{
        extract::ApiJson,
        mw_auth::{CurrentUser, SESSION_USER_KEY},
    },
};
use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use tower_sessions::Session;

// POST /api/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    session: Session,
    ApiJson(form): ApiJson<LoginForm>,
) -> AppResult<Json<UserProfile>> {
    tracing::info!("Login attempt for: {}", form.email);

    // The clear-text password goes out of scope with `form` at the end of this handler.
    let profile = auth_service::authenticate(&state.db_pool, &form.email, &form.password).await?;

    session
        .cycle_id()
        .await
        .map_err(|e| AppError::SessionError(format!("Failed to cycle id: {}", e)))?;
    session
        .insert(SESSION_USER_KEY, &profile.id)
        .await
        .map_err(|e| AppError::SessionError(format!("Failed to write session: {}", e)))?;

    tracing::info!("✅ Login successful for: {}", profile.email);
    Ok(Json(profile))
}

// POST /api/auth/logout
pub async fn handle_logout(session: Session) -> AppResult<StatusCode> {
    let user_id: Option<String> = session.get(SESSION_USER_KEY).await.ok().flatten();

    session
        .delete()
        .await
        .map_err(|e| AppError::SessionError(format!("Failed to delete session: {}", e)))?;

    match user_id {
        Some(id) => tracing::info!("🚪 User '{}' logged out.", id),
        None => tracing::info!("🚪 Anonymous session closed."),
    }
    Ok(StatusCode::NO_CONTENT)
}

// GET /api/auth/me
pub async fn handle_me(Extension(current): Extension<CurrentUser>) -> Json<UserProfile> {
    Json(current.0)
}
