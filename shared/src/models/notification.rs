//! Notification Model (outbox rows)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum NotificationKind {
    Approved,
    NeedsAttention,
    NewSubmission,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Notification {
    pub id: i64,
    /// Recipient
    pub user_id: i64,
    pub timesheet_id: Option<i64>,
    pub kind: NotificationKind,
    pub message: String,
    pub sent: bool,
    pub sent_at: Option<i64>,
    pub error: Option<String>,
    pub created_at: i64,
}
