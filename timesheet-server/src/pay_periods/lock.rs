//! 发薪周期锁
//!
//! 工时表的 `week_start` 落在任一已确认周期内即视为锁定。
//! 锁定检查先于授权检查: 无论角色，锁定的工时表一律 `PeriodLocked`。

use chrono::NaiveDate;
use sqlx::SqliteExecutor;

use crate::db::repository::pay_period;
use crate::utils::{AppError, AppResult, ErrorCode};

pub async fn is_locked(exec: impl SqliteExecutor<'_>, week_start: NaiveDate) -> AppResult<bool> {
    Ok(pay_period::find_covering(exec, week_start).await?.is_some())
}

/// 锁定时返回 `PeriodLocked` (409)
pub async fn ensure_unlocked(exec: impl SqliteExecutor<'_>, week_start: NaiveDate) -> AppResult<()> {
    match pay_period::find_covering(exec, week_start).await? {
        Some(period) => Err(AppError::with_message(
            ErrorCode::PeriodLocked,
            format!(
                "Pay period {} to {} is confirmed and locked",
                period.start_date, period.end_date
            ),
        )
        .with_detail("week_start", week_start.to_string())
        .with_detail("pay_period_start", period.start_date.to_string())
        .with_detail("pay_period_end", period.end_date.to_string())),
        None => Ok(()),
    }
}
