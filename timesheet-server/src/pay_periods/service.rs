//! 发薪周期服务
//!
//! 确认规则:
//! 1. 仅管理员
//! 2. `start_date` 必须是周期起始日，`end_date - start_date == 13`
//! 3. 同一 `start_date` 只能确认一次，且不得与已确认周期重叠
//! 4. 范围内所有工时表必须已 APPROVED，否则返回按状态分组的待处理数量
//!
//! 确认后不可撤销。

use chrono::NaiveDate;
use shared::models::{PayPeriod, PayPeriodStatus};
use sqlx::SqlitePool;

use super::{Calendar, lock};
use crate::auth::{ActingUser, Action, AuthorizationPolicy};
use crate::db::repository::{RepoError, pay_period, timesheet};
use crate::utils::{AppError, AppResult, ErrorCode};

#[derive(Debug, Clone)]
pub struct PayPeriodService {
    pool: SqlitePool,
    policy: AuthorizationPolicy,
    calendar: Calendar,
}

impl PayPeriodService {
    pub fn new(pool: SqlitePool, calendar: Calendar) -> Self {
        Self {
            pool,
            policy: AuthorizationPolicy,
            calendar,
        }
    }

    pub fn calendar(&self) -> Calendar {
        self.calendar
    }

    pub async fn is_locked(&self, week_start: NaiveDate) -> AppResult<bool> {
        lock::is_locked(&self.pool, week_start).await
    }

    /// 查询某范围是否已确认
    pub async fn status(
        &self,
        actor: &ActingUser,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> AppResult<PayPeriodStatus> {
        self.policy.check(actor, Action::ManagePayPeriods)?;
        if end_date < start_date {
            return Err(AppError::validation("end_date must not be before start_date"));
        }

        let pay_period = pay_period::find_by_start(&self.pool, start_date)
            .await?
            .filter(|p| p.end_date == end_date);
        Ok(PayPeriodStatus {
            start_date,
            end_date,
            confirmed: pay_period.is_some(),
            pay_period,
        })
    }

    /// 已确认周期，最新在前
    pub async fn list(&self, actor: &ActingUser) -> AppResult<Vec<PayPeriod>> {
        self.policy.check(actor, Action::ManagePayPeriods)?;
        Ok(pay_period::find_all(&self.pool).await?)
    }

    pub async fn confirm(
        &self,
        actor: &ActingUser,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> AppResult<PayPeriod> {
        self.policy.check(actor, Action::ManagePayPeriods)?;

        if !self.calendar.is_pay_period_boundary(start_date) {
            return Err(AppError::with_message(
                ErrorCode::PayPeriodInvalidStart,
                format!(
                    "Pay period must start on {}",
                    self.calendar.pay_period_start_day
                ),
            )
            .with_detail("start_date", start_date.to_string()));
        }
        if !self.calendar.is_full_pay_period(start_date, end_date) {
            return Err(AppError::with_message(
                ErrorCode::PayPeriodInvalidLength,
                "Pay period must span exactly 14 days",
            )
            .with_detail("start_date", start_date.to_string())
            .with_detail("end_date", end_date.to_string()));
        }

        let mut tx = self.pool.begin().await.map_err(RepoError::from)?;

        if pay_period::find_by_start(&mut *tx, start_date).await?.is_some() {
            return Err(AppError::new(ErrorCode::PayPeriodAlreadyConfirmed)
                .with_detail("start_date", start_date.to_string()));
        }
        if let Some(existing) = pay_period::find_overlapping(&mut *tx, start_date, end_date).await? {
            return Err(AppError::new(ErrorCode::PayPeriodOverlap)
                .with_detail("start_date", existing.start_date.to_string())
                .with_detail("end_date", existing.end_date.to_string()));
        }

        let pending = timesheet::pending_counts(&mut *tx, start_date, end_date).await?;
        if !pending.is_empty() {
            let total: i64 = pending.iter().map(|(_, count)| count).sum();
            let by_status: serde_json::Map<String, serde_json::Value> = pending
                .iter()
                .map(|(status, count)| (status.as_str().to_string(), (*count).into()))
                .collect();
            return Err(AppError::with_message(
                ErrorCode::PayPeriodHasPending,
                format!("{total} timesheet(s) in range are not approved"),
            )
            .with_detail("pending", by_status)
            .with_detail("pending_total", total));
        }

        let period = pay_period::insert(&mut *tx, start_date, end_date, actor.id).await?;
        tx.commit().await.map_err(RepoError::from)?;

        tracing::info!(
            pay_period_id = period.id,
            start_date = %period.start_date,
            end_date = %period.end_date,
            actor_id = actor.id,
            "Pay period confirmed"
        );
        Ok(period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support;
    use shared::models::{Role, TimesheetStatus};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn setup() -> (PayPeriodService, ActingUser, SqlitePool) {
        let pool = test_support::pool().await;
        let admin = test_support::user(&pool, "admin@example.com", Role::Admin).await;
        let service = PayPeriodService::new(pool.clone(), Calendar::default());
        (
            service,
            ActingUser {
                id: admin.id,
                role: Role::Admin,
            },
            pool,
        )
    }

    #[tokio::test]
    async fn test_confirm_requires_admin() {
        let (service, _, _) = setup().await;
        let approver = ActingUser {
            id: 99,
            role: Role::Approver,
        };
        let err = service
            .confirm(&approver, date(2024, 3, 4), date(2024, 3, 17))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::AdminRequired);
    }

    #[tokio::test]
    async fn test_confirm_validates_range() {
        let (service, admin, _) = setup().await;
        let err = service
            .confirm(&admin, date(2024, 3, 5), date(2024, 3, 18))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PayPeriodInvalidStart);

        let err = service
            .confirm(&admin, date(2024, 3, 4), date(2024, 3, 10))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PayPeriodInvalidLength);
    }

    #[tokio::test]
    async fn test_confirm_reports_pending_by_status() {
        let (service, admin, pool) = setup().await;
        let owner = test_support::user(&pool, "e@example.com", Role::Engineer).await;
        let other = test_support::user(&pool, "f@example.com", Role::Engineer).await;
        let a = timesheet::insert(&pool, owner.id, date(2024, 3, 10)).await.unwrap();
        timesheet::insert(&pool, other.id, date(2024, 3, 10)).await.unwrap();
        timesheet::mark_submitted(&pool, a.id, TimesheetStatus::New, TimesheetStatus::Submitted)
            .await
            .unwrap();

        let err = service
            .confirm(&admin, date(2024, 3, 4), date(2024, 3, 17))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PayPeriodHasPending);
        let details = err.details.unwrap();
        assert_eq!(details["pending_total"], 2);
        assert_eq!(details["pending"]["NEW"], 1);
        assert_eq!(details["pending"]["SUBMITTED"], 1);
        assert!(!service.is_locked(date(2024, 3, 10)).await.unwrap());
    }

    #[tokio::test]
    async fn test_confirm_once_then_locked() {
        let (service, admin, pool) = setup().await;
        let owner = test_support::user(&pool, "e@example.com", Role::Engineer).await;
        let ts = timesheet::insert(&pool, owner.id, date(2024, 3, 10)).await.unwrap();
        timesheet::mark_submitted(&pool, ts.id, TimesheetStatus::New, TimesheetStatus::Submitted)
            .await
            .unwrap();
        timesheet::mark_approved(&pool, ts.id, TimesheetStatus::Submitted, admin.id)
            .await
            .unwrap();

        let period = service
            .confirm(&admin, date(2024, 3, 4), date(2024, 3, 17))
            .await
            .unwrap();
        assert_eq!(period.confirmed_by, admin.id);
        assert!(service.is_locked(date(2024, 3, 10)).await.unwrap());

        let status = service
            .status(&admin, date(2024, 3, 4), date(2024, 3, 17))
            .await
            .unwrap();
        assert!(status.confirmed);

        let err = service
            .confirm(&admin, date(2024, 3, 4), date(2024, 3, 17))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PayPeriodAlreadyConfirmed);

        let err = service
            .confirm(&admin, date(2024, 3, 11), date(2024, 3, 24))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PayPeriodOverlap);

        assert_eq!(service.list(&admin).await.unwrap().len(), 1);
    }
}
