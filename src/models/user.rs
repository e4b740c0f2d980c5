// src/models/user.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResourcePermissions {
    #[serde(default)]
    pub view: bool,
    #[serde(default)]
    pub edit: bool,
    #[serde(default)]
    pub delete: bool,
}

/// The single permission shape used everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Permissions {
    #[serde(default)]
    pub employees: ResourcePermissions,
    #[serde(default)]
    pub attendance: ResourcePermissions,
    #[serde(default)]
    pub export: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Employees,
    Attendance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    View,
    Edit,
    Delete,
}

impl Permissions {
    pub fn all() -> Self {
        let full = ResourcePermissions {
            view: true,
            edit: true,
            delete: true,
        };
        Self {
            employees: full,
            attendance: full,
            export: true,
        }
    }

    pub fn allows(&self, resource: Resource, action: Action) -> bool {
        let perms = match resource {
            Resource::Employees => &self.employees,
            Resource::Attendance => &self.attendance,
        };
        match action {
            Action::View => perms.view,
            Action::Edit => perms.edit,
            Action::Delete => perms.delete,
        }
    }
}

/// A row of the `users` table.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub permissions: Json<Permissions>,
    pub created_at: DateTime<Utc>,
}

/// What the API exposes about a user. Never carries the hash.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub permissions: Permissions,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            role: u.role,
            permissions: u.permissions.0,
            created_at: u.created_at,
        }
    }
}

impl UserProfile {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Admins hold every permission regardless of the stored set.
    pub fn can(&self, resource: Resource, action: Action) -> bool {
        self.is_admin() || self.permissions.allows(resource, action)
    }

    pub fn can_export(&self) -> bool {
        self.is_admin() || self.permissions.export
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    #[serde(default)]
    pub permissions: Permissions,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserForm {
    pub name: String,
    pub role: Role,
    #[serde(default)]
    pub permissions: Permissions,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordForm {
    pub new_password: String,
}
