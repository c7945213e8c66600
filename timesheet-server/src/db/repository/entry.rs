//! Timesheet Entry Repository

use super::RepoResult;
use shared::models::{EntryInput, TimesheetEntry};
use sqlx::SqliteExecutor;

pub async fn find_by_timesheet(
    exec: impl SqliteExecutor<'_>,
    timesheet_id: i64,
) -> RepoResult<Vec<TimesheetEntry>> {
    let entries = sqlx::query_as::<_, TimesheetEntry>(
        "SELECT id, timesheet_id, entry_date, hour_type, hours FROM timesheet_entry WHERE timesheet_id = ? ORDER BY entry_date, id",
    )
    .bind(timesheet_id)
    .fetch_all(exec)
    .await?;
    Ok(entries)
}

pub async fn delete_by_timesheet(exec: impl SqliteExecutor<'_>, timesheet_id: i64) -> RepoResult<u64> {
    let rows = sqlx::query("DELETE FROM timesheet_entry WHERE timesheet_id = ?")
        .bind(timesheet_id)
        .execute(exec)
        .await?;
    Ok(rows.rows_affected())
}

/// Replace all entries of a timesheet (caller filters out non-positive hours)
pub async fn replace(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    timesheet_id: i64,
    entries: &[EntryInput],
) -> RepoResult<Vec<TimesheetEntry>> {
    delete_by_timesheet(&mut **tx, timesheet_id).await?;

    for entry in entries {
        sqlx::query(
            "INSERT INTO timesheet_entry (id, timesheet_id, entry_date, hour_type, hours) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(shared::util::snowflake_id())
        .bind(timesheet_id)
        .bind(entry.entry_date)
        .bind(entry.hour_type)
        .bind(entry.hours)
        .execute(&mut **tx)
        .await?;
    }

    find_by_timesheet(&mut **tx, timesheet_id).await
}
