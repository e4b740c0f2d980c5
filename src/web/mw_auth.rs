// src/web/mw_auth.rs
use crate::{
    error::{AppError, AppResult},
    models::user::{Action, Resource, UserProfile},
    services::user_service,
    state::AppState,
};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tower_sessions::Session;

/// Session key holding the id of the logged-in user.
pub const SESSION_USER_KEY: &str = "user_id";

/// The authenticated user, placed in the request extensions by `require_auth`.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub UserProfile);

impl CurrentUser {
    pub fn require(&self, resource: Resource, action: Action) -> AppResult<()> {
        if self.0.can(resource, action) {
            Ok(())
        } else {
            tracing::warn!(
                "Access denied for {}: missing {:?} on {:?}",
                self.0.email,
                action,
                resource
            );
            Err(AppError::Forbidden)
        }
    }

    pub fn require_export(&self) -> AppResult<()> {
        if self.0.can_export() {
            Ok(())
        } else {
            tracing::warn!("Access denied for {}: export not allowed", self.0.email);
            Err(AppError::Forbidden)
        }
    }
}

/// Rejects requests without a valid session and loads the user for the handlers.
pub async fn require_auth(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user_id = session
        .get::<String>(SESSION_USER_KEY)
        .await
        .map_err(|e| {
            tracing::error!("Auth MW: failed to read session: {:?}", e);
            AppError::SessionError(format!("Failed to read session: {}", e))
        })?
        .ok_or_else(|| {
            tracing::debug!("Auth MW: no user in session.");
            AppError::Unauthorized
        })?;

    // The account may have been deleted since the login.
    let user = user_service::find_user_by_id(&state.db_pool, &user_id)
        .await?
        .ok_or_else(|| {
            tracing::warn!("Auth MW: session refers to missing user '{}'.", user_id);
            AppError::Unauthorized
        })?;

    tracing::debug!("Auth MW: user '{}' authenticated.", user.email);
    request
        .extensions_mut()
        .insert(CurrentUser(UserProfile::from(user)));

    Ok(next.run(request).await)
}
