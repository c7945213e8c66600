//! 日历计算
//!
//! 工时周固定从 `week_start_day` 开始，发薪周期固定 14 天且从
//! `pay_period_start_day` 开始。纯计算，无 IO。

use chrono::{Datelike, Days, NaiveDate, Weekday};

use crate::utils::{AppError, AppResult};

/// 发薪周期天数
pub const PAY_PERIOD_DAYS: u64 = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calendar {
    pub week_start_day: Weekday,
    pub pay_period_start_day: Weekday,
}

impl Default for Calendar {
    fn default() -> Self {
        Self {
            week_start_day: Weekday::Sun,
            pay_period_start_day: Weekday::Mon,
        }
    }
}

impl Calendar {
    pub fn new(week_start_day: Weekday, pay_period_start_day: Weekday) -> Self {
        Self {
            week_start_day,
            pay_period_start_day,
        }
    }

    /// 归一到所在工时周的第一天 (不晚于 `date`)
    ///
    /// 整周超出可表示的日期范围时返回校验错误。
    pub fn week_start_of(&self, date: NaiveDate) -> AppResult<NaiveDate> {
        let offset = (7 + date.weekday().num_days_from_monday()
            - self.week_start_day.num_days_from_monday())
            % 7;
        let start = date
            .checked_sub_days(Days::new(u64::from(offset)))
            .ok_or_else(|| out_of_range(date))?;
        self.week_end(start)?;
        Ok(start)
    }

    /// 工时周的 7 天
    pub fn week_dates(&self, week_start: NaiveDate) -> AppResult<[NaiveDate; 7]> {
        let mut days = [week_start; 7];
        for (i, day) in days.iter_mut().enumerate() {
            *day = week_start
                .checked_add_days(Days::new(i as u64))
                .ok_or_else(|| out_of_range(week_start))?;
        }
        Ok(days)
    }

    /// 工时周最后一天
    pub fn week_end(&self, week_start: NaiveDate) -> AppResult<NaiveDate> {
        week_start
            .checked_add_days(Days::new(6))
            .ok_or_else(|| out_of_range(week_start))
    }

    pub fn is_pay_period_boundary(&self, date: NaiveDate) -> bool {
        date.weekday() == self.pay_period_start_day
    }

    /// `end` 是否恰好是 `start` 起第 14 天
    pub fn is_full_pay_period(&self, start: NaiveDate, end: NaiveDate) -> bool {
        start.checked_add_days(Days::new(PAY_PERIOD_DAYS - 1)) == Some(end)
    }
}

fn out_of_range(date: NaiveDate) -> AppError {
    AppError::validation("date is outside the supported calendar range")
        .with_detail("date", date.to_string())
}
