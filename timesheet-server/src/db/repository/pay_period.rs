//! Pay Period Repository

use super::RepoResult;
use chrono::NaiveDate;
use shared::models::PayPeriod;
use sqlx::SqliteExecutor;

const SELECT: &str = "SELECT id, start_date, end_date, confirmed_at, confirmed_by FROM pay_period";

/// Confirmed period whose range contains `date`
pub async fn find_covering(
    exec: impl SqliteExecutor<'_>,
    date: NaiveDate,
) -> RepoResult<Option<PayPeriod>> {
    let period = sqlx::query_as::<_, PayPeriod>(&format!(
        "{SELECT} WHERE start_date <= ?1 AND end_date >= ?1 LIMIT 1"
    ))
    .bind(date)
    .fetch_optional(exec)
    .await?;
    Ok(period)
}

pub async fn find_by_start(
    exec: impl SqliteExecutor<'_>,
    start: NaiveDate,
) -> RepoResult<Option<PayPeriod>> {
    let period = sqlx::query_as::<_, PayPeriod>(&format!("{SELECT} WHERE start_date = ?"))
        .bind(start)
        .fetch_optional(exec)
        .await?;
    Ok(period)
}

/// Any confirmed period intersecting `[start, end]`
pub async fn find_overlapping(
    exec: impl SqliteExecutor<'_>,
    start: NaiveDate,
    end: NaiveDate,
) -> RepoResult<Option<PayPeriod>> {
    let period = sqlx::query_as::<_, PayPeriod>(&format!(
        "{SELECT} WHERE start_date <= ?2 AND end_date >= ?1 ORDER BY start_date LIMIT 1"
    ))
    .bind(start)
    .bind(end)
    .fetch_optional(exec)
    .await?;
    Ok(period)
}

/// Newest first
pub async fn find_all(exec: impl SqliteExecutor<'_>) -> RepoResult<Vec<PayPeriod>> {
    let list = sqlx::query_as::<_, PayPeriod>(&format!("{SELECT} ORDER BY start_date DESC"))
        .fetch_all(exec)
        .await?;
    Ok(list)
}

pub async fn insert(
    exec: impl SqliteExecutor<'_>,
    start: NaiveDate,
    end: NaiveDate,
    confirmed_by: i64,
) -> RepoResult<PayPeriod> {
    let period = sqlx::query_as::<_, PayPeriod>(
        "INSERT INTO pay_period (id, start_date, end_date, confirmed_at, confirmed_by) VALUES (?, ?, ?, ?, ?) RETURNING id, start_date, end_date, confirmed_at, confirmed_by",
    )
    .bind(shared::util::snowflake_id())
    .bind(start)
    .bind(end)
    .bind(shared::util::now_millis())
    .bind(confirmed_by)
    .fetch_one(exec)
    .await?;
    Ok(period)
}
