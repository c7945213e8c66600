//! Timesheet Model

use super::{Attachment, Note, Patch, ReimbursementItem, ReimbursementItemInput, TimesheetEntry};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Timesheet lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum TimesheetStatus {
    /// Being filled in by the owner
    New,
    Submitted,
    /// Submitted or rejected, missing required proof
    NeedsApproval,
    Approved,
}

impl TimesheetStatus {
    pub const ALL: [TimesheetStatus; 4] = [
        TimesheetStatus::New,
        TimesheetStatus::Submitted,
        TimesheetStatus::NeedsApproval,
        TimesheetStatus::Approved,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            TimesheetStatus::New => "NEW",
            TimesheetStatus::Submitted => "SUBMITTED",
            TimesheetStatus::NeedsApproval => "NEEDS_APPROVAL",
            TimesheetStatus::Approved => "APPROVED",
        }
    }
}

impl FromStr for TimesheetStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimesheetStatus::ALL
            .into_iter()
            .find(|st| st.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown timesheet status: {s}"))
    }
}

impl fmt::Display for TimesheetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Timesheet entity (one user, one week)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Timesheet {
    pub id: i64,
    pub user_id: i64,
    pub week_start: NaiveDate,
    pub status: TimesheetStatus,
    pub traveled: bool,
    pub has_expenses: bool,
    pub reimbursement_needed: bool,
    /// Sum of reimbursement item amounts
    pub reimbursement_amount: f64,
    pub stipend_date: Option<NaiveDate>,
    pub user_notes: Option<String>,
    pub admin_notes: Option<String>,
    pub submitted_at: Option<i64>,
    pub approved_at: Option<i64>,
    pub approved_by: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create timesheet payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimesheetCreate {
    /// Any date in the target week
    pub week_start: NaiveDate,
    /// Pre-fill Mon-Fri with 8h entries
    #[serde(default)]
    pub auto_populate: bool,
}

/// Update timesheet payload (owner fields)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimesheetUpdate {
    pub traveled: Option<bool>,
    pub has_expenses: Option<bool>,
    pub reimbursement_needed: Option<bool>,
    /// `null` clears the stored date
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub stipend_date: Patch<NaiveDate>,
    pub user_notes: Option<String>,
    /// Replace-all when present
    pub reimbursement_items: Option<Vec<ReimbursementItemInput>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectRequest {
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminNotesUpdate {
    pub admin_notes: Option<String>,
}

/// Query filter for the owner's own list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimesheetListQuery {
    pub status: Option<TimesheetStatus>,
}

/// Query filter for the review queue
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewQuery {
    pub status: Option<TimesheetStatus>,
    pub user_id: Option<i64>,
    pub week_start: Option<NaiveDate>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Hour totals for one timesheet
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TimesheetTotals {
    pub payable: f64,
    pub billable: f64,
    pub unpaid: f64,
    pub total: f64,
}

/// Timesheet with everything hanging off it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimesheetDetail {
    #[serde(flatten)]
    pub timesheet: Timesheet,
    pub entries: Vec<TimesheetEntry>,
    pub attachments: Vec<Attachment>,
    pub reimbursement_items: Vec<ReimbursementItem>,
    pub notes: Vec<Note>,
    pub totals: TimesheetTotals,
    /// Submitting now would land in NEEDS_APPROVAL
    pub needs_review: bool,
}

/// Review queue row: timesheet plus owner info
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ReviewItem {
    #[serde(flatten)]
    #[cfg_attr(feature = "db", sqlx(flatten))]
    pub timesheet: Timesheet,
    pub owner_name: String,
    pub owner_role: String,
}
