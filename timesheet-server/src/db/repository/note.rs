//! Note Repository

use super::RepoResult;
use shared::models::Note;
use sqlx::SqliteExecutor;

pub async fn find_by_timesheet(
    exec: impl SqliteExecutor<'_>,
    timesheet_id: i64,
) -> RepoResult<Vec<Note>> {
    let notes = sqlx::query_as::<_, Note>(
        "SELECT id, timesheet_id, author_id, content, created_at FROM note WHERE timesheet_id = ? ORDER BY created_at, id",
    )
    .bind(timesheet_id)
    .fetch_all(exec)
    .await?;
    Ok(notes)
}

pub async fn insert(
    exec: impl SqliteExecutor<'_>,
    timesheet_id: i64,
    author_id: i64,
    content: &str,
) -> RepoResult<Note> {
    let note = sqlx::query_as::<_, Note>(
        "INSERT INTO note (id, timesheet_id, author_id, content, created_at) VALUES (?, ?, ?, ?, ?) RETURNING id, timesheet_id, author_id, content, created_at",
    )
    .bind(shared::util::snowflake_id())
    .bind(timesheet_id)
    .bind(author_id)
    .bind(content)
    .bind(shared::util::now_millis())
    .fetch_one(exec)
    .await?;
    Ok(note)
}

pub async fn delete_by_timesheet(exec: impl SqliteExecutor<'_>, timesheet_id: i64) -> RepoResult<u64> {
    let rows = sqlx::query("DELETE FROM note WHERE timesheet_id = ?")
        .bind(timesheet_id)
        .execute(exec)
        .await?;
    Ok(rows.rows_affected())
}
