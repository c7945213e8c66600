//! 通知文案
//!
//! 短信长度限制 160 字符，超出部分截断。

use chrono::NaiveDate;

use crate::utils::time::format_display_date;

pub const MAX_MESSAGE_CHARS: usize = 160;

pub fn approved(week_start: NaiveDate) -> String {
    truncate(format!(
        "Your timesheet for week of {} has been approved!",
        format_display_date(week_start)
    ))
}

pub fn needs_attention(week_start: NaiveDate, reason: &str) -> String {
    truncate(format!(
        "Your timesheet for week of {} needs attention: {}",
        format_display_date(week_start),
        reason.trim()
    ))
}

pub fn new_submission(owner_name: &str, week_start: NaiveDate) -> String {
    truncate(format!(
        "{} submitted a timesheet for week of {}",
        owner_name,
        format_display_date(week_start)
    ))
}

fn truncate(message: String) -> String {
    match message.char_indices().nth(MAX_MESSAGE_CHARS) {
        Some((idx, _)) => message[..idx].to_string(),
        None => message,
    }
}
