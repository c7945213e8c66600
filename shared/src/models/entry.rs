//! Timesheet Entry Model

use super::HourType;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One (date, hour type, hours) line of a timesheet
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct TimesheetEntry {
    pub id: i64,
    pub timesheet_id: i64,
    pub entry_date: NaiveDate,
    pub hour_type: HourType,
    pub hours: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryInput {
    pub entry_date: NaiveDate,
    pub hour_type: HourType,
    pub hours: f64,
}

/// Replace-all entries payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntriesReplace {
    pub entries: Vec<EntryInput>,
}
