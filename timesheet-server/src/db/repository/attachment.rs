//! Attachment Repository

use super::{RepoError, RepoResult};
use shared::models::{Attachment, ReimbursementType};
use sqlx::SqliteExecutor;

const SELECT: &str = "SELECT id, timesheet_id, filename, original_name, mime_type, file_size, sha256, reimbursement_type, uploaded_by, created_at FROM attachment";

/// Row data for a stored upload
#[derive(Debug, Clone)]
pub struct NewAttachment {
    pub timesheet_id: i64,
    pub filename: String,
    pub original_name: String,
    pub mime_type: String,
    pub file_size: i64,
    pub sha256: String,
    pub reimbursement_type: Option<ReimbursementType>,
    pub uploaded_by: i64,
}

pub async fn find_by_timesheet(
    exec: impl SqliteExecutor<'_>,
    timesheet_id: i64,
) -> RepoResult<Vec<Attachment>> {
    let list = sqlx::query_as::<_, Attachment>(&format!(
        "{SELECT} WHERE timesheet_id = ? ORDER BY created_at, id"
    ))
    .bind(timesheet_id)
    .fetch_all(exec)
    .await?;
    Ok(list)
}

pub async fn find_by_id(exec: impl SqliteExecutor<'_>, id: i64) -> RepoResult<Option<Attachment>> {
    let a = sqlx::query_as::<_, Attachment>(&format!("{SELECT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(exec)
        .await?;
    Ok(a)
}

pub async fn insert(exec: impl SqliteExecutor<'_>, data: &NewAttachment) -> RepoResult<Attachment> {
    let a = sqlx::query_as::<_, Attachment>(
        "INSERT INTO attachment (id, timesheet_id, filename, original_name, mime_type, file_size, sha256, reimbursement_type, uploaded_by, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING id, timesheet_id, filename, original_name, mime_type, file_size, sha256, reimbursement_type, uploaded_by, created_at",
    )
    .bind(shared::util::snowflake_id())
    .bind(data.timesheet_id)
    .bind(&data.filename)
    .bind(&data.original_name)
    .bind(&data.mime_type)
    .bind(data.file_size)
    .bind(&data.sha256)
    .bind(data.reimbursement_type)
    .bind(data.uploaded_by)
    .bind(shared::util::now_millis())
    .fetch_one(exec)
    .await?;
    Ok(a)
}

pub async fn delete(exec: impl SqliteExecutor<'_>, id: i64) -> RepoResult<()> {
    let rows = sqlx::query("DELETE FROM attachment WHERE id = ?")
        .bind(id)
        .execute(exec)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Attachment {id} not found")));
    }
    Ok(())
}

pub async fn delete_by_timesheet(exec: impl SqliteExecutor<'_>, timesheet_id: i64) -> RepoResult<u64> {
    let rows = sqlx::query("DELETE FROM attachment WHERE timesheet_id = ?")
        .bind(timesheet_id)
        .execute(exec)
        .await?;
    Ok(rows.rows_affected())
}
