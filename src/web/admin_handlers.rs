// src/web/admin_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::user::{ChangePasswordForm, CreateUserForm, Role, UpdateUserForm, UserProfile},
    services::user_service,
    state::AppState,
    web::{extract::{ApiJson, ApiPath}, mw_auth::CurrentUser},
};
use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use std::time::Duration;

/// Upper bound for creating an account (hashing included).
const CREATE_USER_TIMEOUT: Duration = Duration::from_secs(30);

// GET /api/users
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<UserProfile>>> {
    tracing::debug!("GET /api/users");
    let users = user_service::find_all_users(&state.db_pool).await?;
    Ok(Json(users))
}

// POST /api/users
pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(form): ApiJson<CreateUserForm>,
) -> AppResult<(StatusCode, Json<UserProfile>)> {
    let created = tokio::time::timeout(
        CREATE_USER_TIMEOUT,
        user_service::create_user(&state.db_pool, &form),
    )
    .await
    .map_err(|_| {
        tracing::error!("Creating user '{}' timed out.", form.email);
        AppError::Timeout("User creation".to_string())
    })??;
    Ok((StatusCode::CREATED, Json(created)))
}

// PUT /api/users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ApiPath(id): ApiPath<String>,
    ApiJson(form): ApiJson<UpdateUserForm>,
) -> AppResult<Json<UserProfile>> {
    if id == current.0.id && form.role != Role::Admin {
        return Err(AppError::Validation(
            "You cannot remove your own admin role".to_string(),
        ));
    }
    let updated = user_service::update_user(&state.db_pool, &id, &form).await?;
    Ok(Json(updated))
}

// PUT /api/users/{id}/password
pub async fn change_password(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(form): ApiJson<ChangePasswordForm>,
) -> AppResult<StatusCode> {
    user_service::update_user_password(&state.db_pool, &id, &form.new_password).await?;
    Ok(StatusCode::NO_CONTENT)
}

// DELETE /api/users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ApiPath(id): ApiPath<String>,
) -> AppResult<StatusCode> {
    if id == current.0.id {
        return Err(AppError::Validation("You cannot delete your own account".to_string()));
    }
    user_service::delete_user(&state.db_pool, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
