//! Reimbursement Item Repository

use super::RepoResult;
use shared::models::{ReimbursementItem, ReimbursementItemInput};
use sqlx::SqliteExecutor;

pub async fn find_by_timesheet(
    exec: impl SqliteExecutor<'_>,
    timesheet_id: i64,
) -> RepoResult<Vec<ReimbursementItem>> {
    let items = sqlx::query_as::<_, ReimbursementItem>(
        "SELECT id, timesheet_id, reimbursement_type, amount, expense_date, notes FROM reimbursement_item WHERE timesheet_id = ? ORDER BY id",
    )
    .bind(timesheet_id)
    .fetch_all(exec)
    .await?;
    Ok(items)
}

pub async fn delete_by_timesheet(exec: impl SqliteExecutor<'_>, timesheet_id: i64) -> RepoResult<u64> {
    let rows = sqlx::query("DELETE FROM reimbursement_item WHERE timesheet_id = ?")
        .bind(timesheet_id)
        .execute(exec)
        .await?;
    Ok(rows.rows_affected())
}

/// Replace-all (amounts already validated and clamped by the caller)
pub async fn replace(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    timesheet_id: i64,
    items: &[ReimbursementItemInput],
) -> RepoResult<Vec<ReimbursementItem>> {
    delete_by_timesheet(&mut **tx, timesheet_id).await?;

    for item in items {
        sqlx::query(
            "INSERT INTO reimbursement_item (id, timesheet_id, reimbursement_type, amount, expense_date, notes) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(shared::util::snowflake_id())
        .bind(timesheet_id)
        .bind(item.reimbursement_type)
        .bind(item.amount)
        .bind(item.expense_date)
        .bind(item.notes.as_deref())
        .execute(&mut **tx)
        .await?;
    }

    find_by_timesheet(&mut **tx, timesheet_id).await
}
