//! Notification Outbox Repository

use super::RepoResult;
use shared::models::{Notification, NotificationKind};
use sqlx::SqliteExecutor;

pub async fn insert(
    exec: impl SqliteExecutor<'_>,
    user_id: i64,
    timesheet_id: Option<i64>,
    kind: NotificationKind,
    message: &str,
) -> RepoResult<Notification> {
    let n = sqlx::query_as::<_, Notification>(
        "INSERT INTO notification (id, user_id, timesheet_id, kind, message, sent, created_at) VALUES (?, ?, ?, ?, ?, 0, ?) RETURNING id, user_id, timesheet_id, kind, message, sent, sent_at, error, created_at",
    )
    .bind(shared::util::snowflake_id())
    .bind(user_id)
    .bind(timesheet_id)
    .bind(kind)
    .bind(message)
    .bind(shared::util::now_millis())
    .fetch_one(exec)
    .await?;
    Ok(n)
}

/// Recipient's outbox, newest first
pub async fn find_by_user(
    exec: impl SqliteExecutor<'_>,
    user_id: i64,
    limit: i64,
) -> RepoResult<Vec<Notification>> {
    let list = sqlx::query_as::<_, Notification>(
        "SELECT id, user_id, timesheet_id, kind, message, sent, sent_at, error, created_at FROM notification WHERE user_id = ? ORDER BY created_at DESC, id DESC LIMIT ?",
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(exec)
    .await?;
    Ok(list)
}
