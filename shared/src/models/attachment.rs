//! Attachment Model

use super::ReimbursementType;
use serde::{Deserialize, Serialize};

/// Uploaded file reference (bytes live in the attachment store)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Attachment {
    pub id: i64,
    pub timesheet_id: i64,
    /// Stored file name
    pub filename: String,
    pub original_name: String,
    pub mime_type: String,
    pub file_size: i64,
    pub sha256: String,
    /// Receipt tag, matched against reimbursement items
    pub reimbursement_type: Option<ReimbursementType>,
    pub uploaded_by: i64,
    pub created_at: i64,
}
