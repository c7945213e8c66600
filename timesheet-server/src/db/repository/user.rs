//! User Repository

use super::{RepoError, RepoResult};
use shared::models::{Role, User, UserCreate};
use sqlx::SqliteExecutor;

const SELECT: &str = "SELECT id, email, display_name, role, notifications_enabled, created_at, updated_at FROM app_user";

pub async fn find_by_id(exec: impl SqliteExecutor<'_>, id: i64) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!("{SELECT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(exec)
        .await?;
    Ok(user)
}

pub async fn find_all(exec: impl SqliteExecutor<'_>) -> RepoResult<Vec<User>> {
    let users = sqlx::query_as::<_, User>(&format!("{SELECT} ORDER BY display_name, id"))
        .fetch_all(exec)
        .await?;
    Ok(users)
}

/// Admins who have not opted out of notifications
pub async fn find_notifiable_admins(exec: impl SqliteExecutor<'_>) -> RepoResult<Vec<User>> {
    let names = serde_json::to_string(Role::Admin.stored_names())
        .map_err(|e| RepoError::Database(e.to_string()))?;
    let users = sqlx::query_as::<_, User>(&format!(
        "{SELECT} WHERE notifications_enabled = 1 AND LOWER(TRIM(role)) IN (SELECT value FROM json_each(?)) ORDER BY id"
    ))
    .bind(names)
    .fetch_all(exec)
    .await?;
    Ok(users)
}

pub async fn create(exec: impl SqliteExecutor<'_>, data: &UserCreate) -> RepoResult<User> {
    let now = shared::util::now_millis();
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO app_user (id, email, display_name, role, notifications_enabled, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6) RETURNING id, email, display_name, role, notifications_enabled, created_at, updated_at",
    )
    .bind(shared::util::snowflake_id())
    .bind(data.email.trim().to_lowercase())
    .bind(data.display_name.trim())
    .bind(data.role.as_str())
    .bind(data.notifications_enabled)
    .bind(now)
    .fetch_one(exec)
    .await?;
    Ok(user)
}

/// Store the canonical role name (rewrites legacy aliases)
pub async fn update_role(exec: impl SqliteExecutor<'_>, id: i64, role: Role) -> RepoResult<User> {
    let now = shared::util::now_millis();
    sqlx::query_as::<_, User>(
        "UPDATE app_user SET role = ?1, updated_at = ?2 WHERE id = ?3 RETURNING id, email, display_name, role, notifications_enabled, created_at, updated_at",
    )
    .bind(role.as_str())
    .bind(now)
    .bind(id)
    .fetch_optional(exec)
    .await?
    .ok_or_else(|| RepoError::NotFound(format!("User {id} not found")))
}

pub async fn update_notifications(
    exec: impl SqliteExecutor<'_>,
    id: i64,
    enabled: bool,
) -> RepoResult<User> {
    let now = shared::util::now_millis();
    sqlx::query_as::<_, User>(
        "UPDATE app_user SET notifications_enabled = ?1, updated_at = ?2 WHERE id = ?3 RETURNING id, email, display_name, role, notifications_enabled, created_at, updated_at",
    )
    .bind(enabled)
    .bind(now)
    .bind(id)
    .fetch_optional(exec)
    .await?
    .ok_or_else(|| RepoError::NotFound(format!("User {id} not found")))
}
