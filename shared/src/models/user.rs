//! User Model

use super::role::{Role, UnknownRole};
use serde::{Deserialize, Serialize};

/// User entity
///
/// `role` is kept as the stored string so that rows written by older
/// deployments (`staff`, `support`) still load; use [`User::role`] to get
/// the parsed value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub email: String,
    pub display_name: String,
    #[serde(rename = "role")]
    #[cfg_attr(feature = "db", sqlx(rename = "role"))]
    pub role_name: String,
    pub notifications_enabled: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl User {
    pub fn role(&self) -> Result<Role, UnknownRole> {
        Role::parse(&self.role_name)
    }
}

/// Create user payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreate {
    pub email: String,
    pub display_name: String,
    pub role: Role,
    #[serde(default = "default_true")]
    pub notifications_enabled: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRoleUpdate {
    pub role: Role,
}

/// Self-service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSettingsUpdate {
    pub notifications_enabled: bool,
}
