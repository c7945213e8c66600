//! 工时表状态机
//!
//! ```text
//! NEW ──submit──▶ SUBMITTED ──approve──▶ APPROVED
//!  │                 │  ▲                   │
//!  │              reject│ submit        unapprove
//!  │                 ▼  │                   │
//!  └──submit──▶ NEEDS_APPROVAL ──approve──▶ │
//!                                 SUBMITTED ◀┘
//! ```
//!
//! 提交的目标状态由完整性检查决定。上传附件永远不会改变状态，
//! 只有显式提交才会离开 NEEDS_APPROVAL。
//!
//! 纯函数: 只回答"从某状态发生某事件后变成什么"，不做任何 IO。
//! 锁定检查和授权检查由调用方在此之前完成。

use shared::models::TimesheetStatus;
use thiserror::Error;

use crate::utils::{AppError, ErrorCode};

/// 状态机事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// 本人提交; `needs_review` 为完整性检查结果
    Submit { needs_review: bool },
    Approve,
    Reject,
    Unapprove,
    /// 本人删除
    Delete,
    /// 本人编辑字段、工时条目或备注
    Edit,
    UploadAttachment,
    DeleteAttachment,
    /// 审核人编辑 (管理员备注)
    ReviewerEdit,
}

impl LifecycleEvent {
    pub fn name(&self) -> &'static str {
        match self {
            LifecycleEvent::Submit { .. } => "submit",
            LifecycleEvent::Approve => "approve",
            LifecycleEvent::Reject => "reject",
            LifecycleEvent::Unapprove => "unapprove",
            LifecycleEvent::Delete => "delete",
            LifecycleEvent::Edit => "edit",
            LifecycleEvent::UploadAttachment => "upload_attachment",
            LifecycleEvent::DeleteAttachment => "delete_attachment",
            LifecycleEvent::ReviewerEdit => "reviewer_edit",
        }
    }
}

/// 事件结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// 状态变为
    Status(TimesheetStatus),
    /// 允许，状态不变
    Unchanged,
    /// 工时表被删除
    Removed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot {} a timesheet in status {from}", event.name())]
pub struct InvalidTransition {
    pub from: TimesheetStatus,
    pub event: LifecycleEvent,
}

impl From<InvalidTransition> for AppError {
    fn from(err: InvalidTransition) -> Self {
        AppError::with_message(ErrorCode::InvalidStatus, err.to_string())
            .with_detail("status", err.from.as_str())
            .with_detail("action", err.event.name())
    }
}

/// 状态转移表
pub fn apply(from: TimesheetStatus, event: LifecycleEvent) -> Result<Outcome, InvalidTransition> {
    use LifecycleEvent as E;
    use TimesheetStatus as S;

    let outcome = match (event, from) {
        (E::Submit { needs_review }, S::New | S::NeedsApproval) => Outcome::Status(if needs_review {
            S::NeedsApproval
        } else {
            S::Submitted
        }),
        (E::Approve, S::Submitted | S::NeedsApproval) => Outcome::Status(S::Approved),
        (E::Reject, S::Submitted) => Outcome::Status(S::NeedsApproval),
        (E::Unapprove, S::Approved) => Outcome::Status(S::Submitted),
        (E::Delete, S::New) => Outcome::Removed,
        (E::Edit | E::UploadAttachment, S::New | S::NeedsApproval) => Outcome::Unchanged,
        (E::DeleteAttachment, S::New) => Outcome::Unchanged,
        (E::ReviewerEdit, S::Submitted | S::NeedsApproval | S::Approved) => Outcome::Unchanged,
        _ => return Err(InvalidTransition { from, event }),
    };
    Ok(outcome)
}

/// 事件需要改变状态时返回目标状态
pub fn target_status(
    from: TimesheetStatus,
    event: LifecycleEvent,
) -> Result<TimesheetStatus, InvalidTransition> {
    match apply(from, event)? {
        Outcome::Status(to) => Ok(to),
        Outcome::Unchanged | Outcome::Removed => Ok(from),
    }
}
