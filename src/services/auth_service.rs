// src/services/auth_service.rs
use crate::{
    error::{AppError, AppResult},
    models::user::UserProfile,
    services::user_service,
};
use sqlx::SqlitePool;

/// Checks a password against a stored bcrypt hash.
pub async fn verify_password(password: &str, stored_hash: &str) -> AppResult<bool> {
    let password = password.to_string();
    let stored_hash = stored_hash.to_string();
    tokio::task::spawn_blocking(move || {
        tracing::debug!("Verifying bcrypt hash...");
        bcrypt::verify(&password, &stored_hash)
    })
    .await
    .map_err(|e| {
        tracing::error!("spawn_blocking task failed (verify_password): {:?}", e);
        AppError::InternalServerError
    })?
    .map_err(|e| {
        tracing::error!("bcrypt error while verifying password: {:?}", e);
        AppError::PasswordHashingError
    })
}

pub async fn hash_password(password: &str) -> AppResult<String> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || {
        tracing::debug!("Generating bcrypt hash...");
        bcrypt::hash(&password, bcrypt::DEFAULT_COST)
    })
    .await
    .map_err(|e| {
        tracing::error!("spawn_blocking task failed (hash_password): {:?}", e);
        AppError::InternalServerError
    })?
    .map_err(|e| {
        tracing::error!("bcrypt error while hashing password: {:?}", e);
        AppError::PasswordHashingError
    })
}

/// Resolves email + password to a user. Unknown email and wrong password are
/// indistinguishable to the caller.
pub async fn authenticate(db_pool: &SqlitePool, email: &str, password: &str) -> AppResult<UserProfile> {
    let user = match user_service::find_user_by_email(db_pool, email).await? {
        Some(user) => user,
        None => {
            tracing::warn!("Login attempt for unknown email: {}", email);
            return Err(AppError::InvalidCredentials);
        }
    };

    if verify_password(password, &user.password_hash).await? {
        Ok(UserProfile::from(user))
    } else {
        tracing::warn!("Wrong password for {}", email);
        Err(AppError::InvalidCredentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use crate::models::user::{CreateUserForm, Permissions, Role};

    #[tokio::test]
    async fn test_hash_and_verify() {
        let hash = hash_password("s3cret").await.unwrap();
        assert_ne!(hash, "s3cret");
        assert!(verify_password("s3cret", &hash).await.unwrap());
        assert!(!verify_password("wrong", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_authenticate() {
        let pool = create_test_pool().await;
        let form = CreateUserForm {
            name: "Clerk".into(),
            email: "clerk@example.com".into(),
            password: "clerk-pass".into(),
            role: Role::User,
            permissions: Permissions::default(),
        };
        user_service::create_user(&pool, &form).await.unwrap();

        let profile = authenticate(&pool, "CLERK@example.com", "clerk-pass").await.unwrap();
        assert_eq!(profile.name, "Clerk");

        assert!(matches!(
            authenticate(&pool, "clerk@example.com", "nope").await,
            Err(AppError::InvalidCredentials)
        ));
        assert!(matches!(
            authenticate(&pool, "ghost@example.com", "clerk-pass").await,
            Err(AppError::InvalidCredentials)
        ));
    }
}
