//! Timesheet Repository

use super::{RepoError, RepoResult};
use chrono::NaiveDate;
use shared::models::{ReviewItem, Role, Timesheet, TimesheetStatus, TimesheetUpdate};
use sqlx::SqliteExecutor;

macro_rules! timesheet_columns {
    ($prefix:literal) => {
        concat!(
            $prefix, "id, ", $prefix, "user_id, ", $prefix, "week_start, ", $prefix, "status, ",
            $prefix, "traveled, ", $prefix, "has_expenses, ", $prefix, "reimbursement_needed, ",
            $prefix, "reimbursement_amount, ", $prefix, "stipend_date, ", $prefix, "user_notes, ",
            $prefix, "admin_notes, ", $prefix, "submitted_at, ", $prefix, "approved_at, ",
            $prefix, "approved_by, ", $prefix, "created_at, ", $prefix, "updated_at"
        )
    };
}

const SELECT: &str = concat!("SELECT ", timesheet_columns!(""), " FROM timesheet");
const RETURNING: &str = concat!(" RETURNING ", timesheet_columns!(""));

/// Review queue filter (NEW timesheets are never listed)
#[derive(Debug, Clone, Default)]
pub struct ReviewFilter<'a> {
    pub status: Option<TimesheetStatus>,
    pub user_id: Option<i64>,
    pub week_start: Option<NaiveDate>,
    /// Restrict owners to these roles; `None` = any role
    pub owner_roles: Option<&'a [Role]>,
}

impl ReviewFilter<'_> {
    /// JSON array of every stored spelling of the allowed roles
    fn owner_roles_json(&self) -> RepoResult<Option<String>> {
        self.owner_roles
            .map(|roles| {
                let names: Vec<&str> = roles
                    .iter()
                    .flat_map(|r| r.stored_names().iter().copied())
                    .collect();
                serde_json::to_string(&names).map_err(|e| RepoError::Database(e.to_string()))
            })
            .transpose()
    }
}

const REVIEW_WHERE: &str = "WHERE t.status != 'NEW' AND (?1 IS NULL OR t.status = ?1) AND (?2 IS NULL OR t.user_id = ?2) AND (?3 IS NULL OR t.week_start = ?3) AND (?4 IS NULL OR LOWER(TRIM(u.role)) IN (SELECT value FROM json_each(?4)))";

pub async fn find_by_id(exec: impl SqliteExecutor<'_>, id: i64) -> RepoResult<Option<Timesheet>> {
    let ts = sqlx::query_as::<_, Timesheet>(&format!("{SELECT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(exec)
        .await?;
    Ok(ts)
}

pub async fn find_by_user_week(
    exec: impl SqliteExecutor<'_>,
    user_id: i64,
    week_start: NaiveDate,
) -> RepoResult<Option<Timesheet>> {
    let ts = sqlx::query_as::<_, Timesheet>(&format!(
        "{SELECT} WHERE user_id = ? AND week_start = ?"
    ))
    .bind(user_id)
    .bind(week_start)
    .fetch_optional(exec)
    .await?;
    Ok(ts)
}

/// Owner's timesheets, newest week first
pub async fn find_by_user(
    exec: impl SqliteExecutor<'_>,
    user_id: i64,
    status: Option<TimesheetStatus>,
) -> RepoResult<Vec<Timesheet>> {
    let list = sqlx::query_as::<_, Timesheet>(&format!(
        "{SELECT} WHERE user_id = ?1 AND (?2 IS NULL OR status = ?2) ORDER BY week_start DESC"
    ))
    .bind(user_id)
    .bind(status)
    .fetch_all(exec)
    .await?;
    Ok(list)
}

/// Insert a NEW timesheet; `(user_id, week_start)` collisions surface as `Duplicate`
pub async fn insert(
    exec: impl SqliteExecutor<'_>,
    user_id: i64,
    week_start: NaiveDate,
) -> RepoResult<Timesheet> {
    let now = shared::util::now_millis();
    let ts = sqlx::query_as::<_, Timesheet>(&format!(
        "INSERT INTO timesheet (id, user_id, week_start, status, created_at, updated_at) VALUES (?1, ?2, ?3, 'NEW', ?4, ?4){RETURNING}"
    ))
    .bind(shared::util::snowflake_id())
    .bind(user_id)
    .bind(week_start)
    .bind(now)
    .fetch_one(exec)
    .await?;
    Ok(ts)
}

/// Owner-editable fields; `None` keeps the stored value, `stipend_date` follows its `Patch`
pub async fn update_owner_fields(
    exec: impl SqliteExecutor<'_>,
    id: i64,
    data: &TimesheetUpdate,
    reimbursement_amount: Option<f64>,
) -> RepoResult<Timesheet> {
    let now = shared::util::now_millis();
    let stipend_change = data.stipend_date.as_change();
    sqlx::query_as::<_, Timesheet>(&format!(
        "UPDATE timesheet SET traveled = COALESCE(?1, traveled), has_expenses = COALESCE(?2, has_expenses), reimbursement_needed = COALESCE(?3, reimbursement_needed), stipend_date = CASE WHEN ?4 THEN ?5 ELSE stipend_date END, user_notes = COALESCE(?6, user_notes), reimbursement_amount = COALESCE(?7, reimbursement_amount), updated_at = ?8 WHERE id = ?9{RETURNING}"
    ))
    .bind(data.traveled)
    .bind(data.has_expenses)
    .bind(data.reimbursement_needed)
    .bind(stipend_change.is_some())
    .bind(stipend_change.flatten().copied())
    .bind(data.user_notes.as_deref())
    .bind(reimbursement_amount)
    .bind(now)
    .bind(id)
    .fetch_optional(exec)
    .await?
    .ok_or_else(|| RepoError::NotFound(format!("Timesheet {id} not found")))
}

pub async fn touch(exec: impl SqliteExecutor<'_>, id: i64) -> RepoResult<()> {
    let rows = sqlx::query("UPDATE timesheet SET updated_at = ? WHERE id = ?")
        .bind(shared::util::now_millis())
        .bind(id)
        .execute(exec)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Timesheet {id} not found")));
    }
    Ok(())
}

fn status_changed(id: i64, from: TimesheetStatus) -> RepoError {
    RepoError::NotFound(format!("Timesheet {id} not found in status {from}"))
}

/// NEW / NEEDS_APPROVAL → SUBMITTED or NEEDS_APPROVAL
pub async fn mark_submitted(
    exec: impl SqliteExecutor<'_>,
    id: i64,
    from: TimesheetStatus,
    to: TimesheetStatus,
) -> RepoResult<Timesheet> {
    let now = shared::util::now_millis();
    sqlx::query_as::<_, Timesheet>(&format!(
        "UPDATE timesheet SET status = ?1, submitted_at = ?2, updated_at = ?2 WHERE id = ?3 AND status = ?4{RETURNING}"
    ))
    .bind(to)
    .bind(now)
    .bind(id)
    .bind(from)
    .fetch_optional(exec)
    .await?
    .ok_or_else(|| status_changed(id, from))
}

pub async fn mark_approved(
    exec: impl SqliteExecutor<'_>,
    id: i64,
    from: TimesheetStatus,
    approver_id: i64,
) -> RepoResult<Timesheet> {
    let now = shared::util::now_millis();
    sqlx::query_as::<_, Timesheet>(&format!(
        "UPDATE timesheet SET status = 'APPROVED', approved_at = ?1, approved_by = ?2, updated_at = ?1 WHERE id = ?3 AND status = ?4{RETURNING}"
    ))
    .bind(now)
    .bind(approver_id)
    .bind(id)
    .bind(from)
    .fetch_optional(exec)
    .await?
    .ok_or_else(|| status_changed(id, from))
}

/// SUBMITTED → NEEDS_APPROVAL, reason kept as admin notes
pub async fn mark_rejected(
    exec: impl SqliteExecutor<'_>,
    id: i64,
    reason: &str,
) -> RepoResult<Timesheet> {
    let now = shared::util::now_millis();
    sqlx::query_as::<_, Timesheet>(&format!(
        "UPDATE timesheet SET status = 'NEEDS_APPROVAL', admin_notes = ?1, updated_at = ?2 WHERE id = ?3 AND status = 'SUBMITTED'{RETURNING}"
    ))
    .bind(reason)
    .bind(now)
    .bind(id)
    .fetch_optional(exec)
    .await?
    .ok_or_else(|| status_changed(id, TimesheetStatus::Submitted))
}

/// APPROVED → SUBMITTED, approval stamp cleared
pub async fn mark_unapproved(exec: impl SqliteExecutor<'_>, id: i64) -> RepoResult<Timesheet> {
    let now = shared::util::now_millis();
    sqlx::query_as::<_, Timesheet>(&format!(
        "UPDATE timesheet SET status = 'SUBMITTED', approved_at = NULL, approved_by = NULL, updated_at = ?1 WHERE id = ?2 AND status = 'APPROVED'{RETURNING}"
    ))
    .bind(now)
    .bind(id)
    .fetch_optional(exec)
    .await?
    .ok_or_else(|| status_changed(id, TimesheetStatus::Approved))
}

pub async fn set_admin_notes(
    exec: impl SqliteExecutor<'_>,
    id: i64,
    notes: Option<&str>,
) -> RepoResult<Timesheet> {
    let now = shared::util::now_millis();
    sqlx::query_as::<_, Timesheet>(&format!(
        "UPDATE timesheet SET admin_notes = ?1, updated_at = ?2 WHERE id = ?3{RETURNING}"
    ))
    .bind(notes)
    .bind(now)
    .bind(id)
    .fetch_optional(exec)
    .await?
    .ok_or_else(|| RepoError::NotFound(format!("Timesheet {id} not found")))
}

pub async fn delete(exec: impl SqliteExecutor<'_>, id: i64) -> RepoResult<()> {
    let rows = sqlx::query("DELETE FROM timesheet WHERE id = ?")
        .bind(id)
        .execute(exec)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Timesheet {id} not found")));
    }
    Ok(())
}

pub async fn find_for_review(
    exec: impl SqliteExecutor<'_>,
    filter: &ReviewFilter<'_>,
    limit: i64,
    offset: i64,
) -> RepoResult<Vec<ReviewItem>> {
    let roles = filter.owner_roles_json()?;
    let items = sqlx::query_as::<_, ReviewItem>(&format!(
        "SELECT {}, u.display_name AS owner_name, u.role AS owner_role FROM timesheet t JOIN app_user u ON u.id = t.user_id {REVIEW_WHERE} ORDER BY t.week_start DESC, t.submitted_at DESC, t.id LIMIT ?5 OFFSET ?6",
        timesheet_columns!("t.")
    ))
    .bind(filter.status)
    .bind(filter.user_id)
    .bind(filter.week_start)
    .bind(roles)
    .bind(limit)
    .bind(offset)
    .fetch_all(exec)
    .await?;
    Ok(items)
}

pub async fn count_for_review(
    exec: impl SqliteExecutor<'_>,
    filter: &ReviewFilter<'_>,
) -> RepoResult<i64> {
    let roles = filter.owner_roles_json()?;
    let count: i64 = sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM timesheet t JOIN app_user u ON u.id = t.user_id {REVIEW_WHERE}"
    ))
    .bind(filter.status)
    .bind(filter.user_id)
    .bind(filter.week_start)
    .bind(roles)
    .fetch_one(exec)
    .await?;
    Ok(count)
}

/// Non-approved timesheets per status with `week_start` in `[start, end]`
pub async fn pending_counts(
    exec: impl SqliteExecutor<'_>,
    start: NaiveDate,
    end: NaiveDate,
) -> RepoResult<Vec<(TimesheetStatus, i64)>> {
    let rows = sqlx::query_as::<_, (TimesheetStatus, i64)>(
        "SELECT status, COUNT(*) FROM timesheet WHERE week_start BETWEEN ? AND ? AND status != 'APPROVED' GROUP BY status ORDER BY status",
    )
    .bind(start)
    .bind(end)
    .fetch_all(exec)
    .await?;
    Ok(rows)
}
