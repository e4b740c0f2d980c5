// src/web/mw_admin.rs
use crate::{error::AppError, web::mw_auth::CurrentUser};
use axum::{
    extract::{Extension, Request},
    middleware::Next,
    response::Response,
};

/// Only lets admins through. Must run after `require_auth`.
pub async fn require_admin(
    Extension(current): Extension<CurrentUser>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if current.0.is_admin() {
        tracing::debug!("Admin MW: access granted for {}", current.0.email);
        Ok(next.run(request).await)
    } else {
        tracing::warn!("Admin MW: access denied for {} (not an admin).", current.0.email);
        Err(AppError::Forbidden)
    }
}
