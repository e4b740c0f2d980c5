// src/services/user_service.rs
use crate::{
    config::BootstrapAdmin,
    error::{conflict_on_unique, AppError, AppResult},
    models::user::{CreateUserForm, Permissions, Role, UpdateUserForm, User, UserProfile},
    services::auth_service,
};
use chrono::Utc;
use sqlx::types::Json;
use sqlx::SqlitePool;
use uuid::Uuid;

const SELECT_USER: &str = r#"
    SELECT id, name, email, password_hash, role, permissions, created_at
    FROM users
"#;

const MIN_PASSWORD_LEN: usize = 8;

pub async fn find_user_by_id(db_pool: &SqlitePool, user_id: &str) -> AppResult<Option<User>> {
    tracing::debug!("Looking up user by id: {}", user_id);
    let user = sqlx::query_as::<_, User>(&format!("{} WHERE id = ?1", SELECT_USER))
        .bind(user_id)
        .fetch_optional(db_pool)
        .await?;
    Ok(user)
}

/// Email lookup is case-insensitive (the column is `COLLATE NOCASE`).
pub async fn find_user_by_email(db_pool: &SqlitePool, email: &str) -> AppResult<Option<User>> {
    tracing::debug!("Looking up user by email: {}", email);
    let user = sqlx::query_as::<_, User>(&format!("{} WHERE email = ?1", SELECT_USER))
        .bind(email.trim())
        .fetch_optional(db_pool)
        .await?;
    Ok(user)
}

pub async fn find_all_users(db_pool: &SqlitePool) -> AppResult<Vec<UserProfile>> {
    tracing::debug!("Loading all users...");
    let users = sqlx::query_as::<_, User>(&format!("{} ORDER BY name ASC", SELECT_USER))
        .fetch_all(db_pool)
        .await?;
    tracing::debug!("Found {} users.", users.len());
    Ok(users.into_iter().map(UserProfile::from).collect())
}

fn validate_password(password: &str) -> AppResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must have at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

pub async fn create_user(db_pool: &SqlitePool, form: &CreateUserForm) -> AppResult<UserProfile> {
    let name = form.name.trim();
    let email = form.email.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Name is required".to_string()));
    }
    if !email.contains('@') {
        return Err(AppError::Validation("A valid email is required".to_string()));
    }
    validate_password(&form.password)?;

    tracing::info!("Creating user: {}", email);
    let password_hash = auth_service::hash_password(&form.password).await?;

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, name, email, password_hash, role, permissions, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        RETURNING id, name, email, password_hash, role, permissions, created_at
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(form.role)
    .bind(Json(form.permissions))
    .bind(Utc::now())
    .fetch_one(db_pool)
    .await
    .map_err(|e| conflict_on_unique(e, "A user with this email already exists"))?;

    tracing::info!("✅ User '{}' created.", user.email);
    Ok(UserProfile::from(user))
}

pub async fn update_user(
    db_pool: &SqlitePool,
    user_id: &str,
    form: &UpdateUserForm,
) -> AppResult<UserProfile> {
    if form.name.trim().is_empty() {
        return Err(AppError::Validation("Name is required".to_string()));
    }
    tracing::info!("Updating user {} (role: {:?})", user_id, form.role);

    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users SET name = ?1, role = ?2, permissions = ?3
        WHERE id = ?4
        RETURNING id, name, email, password_hash, role, permissions, created_at
        "#,
    )
    .bind(form.name.trim())
    .bind(form.role)
    .bind(Json(form.permissions))
    .bind(user_id)
    .fetch_optional(db_pool)
    .await?;

    match user {
        Some(user) => {
            tracing::info!("✅ User {} updated.", user_id);
            Ok(UserProfile::from(user))
        }
        None => {
            tracing::warn!("Update failed: user '{}' not found.", user_id);
            Err(AppError::NotFound("User".to_string()))
        }
    }
}

pub async fn update_user_password(
    db_pool: &SqlitePool,
    user_id: &str,
    new_raw_password: &str,
) -> AppResult<()> {
    validate_password(new_raw_password)?;
    tracing::info!("Changing password for user: {}", user_id);
    let new_password_hash = auth_service::hash_password(new_raw_password).await?;

    let rows_affected = sqlx::query("UPDATE users SET password_hash = ?1 WHERE id = ?2")
        .bind(new_password_hash)
        .bind(user_id)
        .execute(db_pool)
        .await?
        .rows_affected();

    if rows_affected == 0 {
        tracing::warn!("Password change failed: user '{}' not found.", user_id);
        Err(AppError::NotFound("User".to_string()))
    } else {
        tracing::info!("✅ Password changed for user: {}", user_id);
        Ok(())
    }
}

pub async fn delete_user(db_pool: &SqlitePool, user_id: &str) -> AppResult<()> {
    tracing::info!("Deleting user {}", user_id);
    let rows_affected = sqlx::query("DELETE FROM users WHERE id = ?1")
        .bind(user_id)
        .execute(db_pool)
        .await?
        .rows_affected();

    if rows_affected == 0 {
        tracing::warn!("Delete failed: user '{}' not found.", user_id);
        return Err(AppError::NotFound("User".to_string()));
    }
    Ok(())
}

/// Creates the configured admin when nobody can log in yet.
pub async fn ensure_bootstrap_admin(
    db_pool: &SqlitePool,
    admin: Option<&BootstrapAdmin>,
) -> AppResult<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(db_pool)
        .await?;
    if count > 0 {
        return Ok(());
    }

    match admin {
        Some(admin) => {
            tracing::info!("No users found, creating bootstrap admin {}", admin.email);
            let form = CreateUserForm {
                name: admin.name.clone(),
                email: admin.email.clone(),
                password: admin.password.clone(),
                role: Role::Admin,
                permissions: Permissions::all(),
            };
            create_user(db_pool, &form).await?;
            Ok(())
        }
        None => {
            tracing::warn!("⚠️ No users exist and ADMIN_EMAIL/ADMIN_PASSWORD are not set; nobody can log in.");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;

    fn form(email: &str, role: Role) -> CreateUserForm {
        CreateUserForm {
            name: "Someone".into(),
            email: email.into(),
            password: "long-enough".into(),
            role,
            permissions: Permissions::default(),
        }
    }

    #[tokio::test]
    async fn test_create_user_stores_permissions() {
        let pool = create_test_pool().await;
        let mut f = form("a@example.com", Role::User);
        f.permissions.attendance.view = true;
        f.permissions.export = true;

        let created = create_user(&pool, &f).await.unwrap();
        let stored = find_user_by_id(&pool, &created.id).await.unwrap().unwrap();
        assert_eq!(stored.role, Role::User);
        assert!(stored.permissions.0.attendance.view);
        assert!(stored.permissions.0.export);
        assert!(!stored.permissions.0.employees.view);
        assert_ne!(stored.password_hash, "long-enough");
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let pool = create_test_pool().await;
        create_user(&pool, &form("a@example.com", Role::User)).await.unwrap();
        let err = create_user(&pool, &form("A@example.com", Role::User)).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_short_password_rejected() {
        let pool = create_test_pool().await;
        let mut f = form("a@example.com", Role::User);
        f.password = "short".into();
        assert!(matches!(create_user(&pool, &f).await, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let pool = create_test_pool().await;
        let created = create_user(&pool, &form("a@example.com", Role::User)).await.unwrap();

        let update = UpdateUserForm {
            name: "Promoted".into(),
            role: Role::Admin,
            permissions: Permissions::all(),
        };
        let updated = update_user(&pool, &created.id, &update).await.unwrap();
        assert_eq!(updated.name, "Promoted");
        assert!(updated.is_admin());

        update_user_password(&pool, &created.id, "another-password").await.unwrap();
        let stored = find_user_by_id(&pool, &created.id).await.unwrap().unwrap();
        assert!(auth_service::verify_password("another-password", &stored.password_hash)
            .await
            .unwrap());

        delete_user(&pool, &created.id).await.unwrap();
        assert!(find_user_by_id(&pool, &created.id).await.unwrap().is_none());
        assert!(matches!(
            delete_user(&pool, &created.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_bootstrap_admin_only_when_empty() {
        let pool = create_test_pool().await;
        let admin = BootstrapAdmin {
            name: "Admin".into(),
            email: "admin@example.com".into(),
            password: "admin-password".into(),
        };
        ensure_bootstrap_admin(&pool, Some(&admin)).await.unwrap();
        ensure_bootstrap_admin(&pool, Some(&admin)).await.unwrap();

        let users = find_all_users(&pool).await.unwrap();
        assert_eq!(users.len(), 1);
        assert!(users[0].is_admin());
    }
}
