//! 日期工具函数
//!
//! 日期统一使用 `NaiveDate` (YYYY-MM-DD)，不带时区。

use chrono::{NaiveDate, Weekday};

use super::{AppError, AppResult};

/// 解析日期字符串 (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// 解析星期 (`sun`, `Sunday`, `MON` ...)
pub fn parse_weekday(value: &str) -> Option<Weekday> {
    value.trim().parse::<Weekday>().ok()
}

/// 通知文案中的日期格式: `Mar 04, 2024`
pub fn format_display_date(date: NaiveDate) -> String {
    date.format("%b %d, %Y").to_string()
}
