//! 完整性检查
//!
//! 提交时决定目标状态: 缺少证明材料 → NEEDS_APPROVAL，否则 SUBMITTED。
//!
//! 缺少证明材料指:
//! - 存在需要附件的工时类型 (Field) 且没有任何附件
//! - 存在需要收据的报销项 (Flight / Food / Other)，且没有标记为同一报销类型的附件

use shared::models::{Attachment, ReimbursementItem, TimesheetEntry};

pub fn needs_review(
    entries: &[TimesheetEntry],
    items: &[ReimbursementItem],
    attachments: &[Attachment],
) -> bool {
    let missing_hours_proof =
        attachments.is_empty() && entries.iter().any(|e| e.hour_type.requires_attachment());

    let missing_receipt = items
        .iter()
        .filter(|item| item.reimbursement_type.requires_receipt())
        .any(|item| {
            !attachments
                .iter()
                .any(|a| a.reimbursement_type == Some(item.reimbursement_type))
        });

    missing_hours_proof || missing_receipt
}
