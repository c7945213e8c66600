//! 通知分发
//!
//! # 架构
//!
//! ```text
//! 状态变更 (事务提交后)
//!   └─ NotificationDispatcher::notify_*()  (同步、fire-and-forget)
//!        └─ NotificationService → mpsc → NotificationWorker → notification 表 (outbox)
//! ```
//!
//! 分发失败只记录日志，永远不会回滚状态变更或影响请求结果。
//! 短信 / 邮件 / Teams 投递不在本服务内。

pub mod message;
pub mod worker;

use shared::models::Timesheet;
use tokio::sync::mpsc;

pub use worker::NotificationWorker;

/// 状态机调用的通知接口
pub trait NotificationDispatcher: Send + Sync {
    /// 工时表已批准 → 通知本人
    fn notify_approved(&self, timesheet: &Timesheet);
    /// 工时表被退回 → 通知本人
    fn notify_needs_attention(&self, timesheet: &Timesheet, reason: &str);
    /// 新提交 → 通知所有管理员
    fn notify_admin_new_submission(&self, timesheet: &Timesheet);
}

/// 发送到 worker 的通知请求
#[derive(Debug, Clone)]
pub enum NotificationRequest {
    Approved {
        timesheet: Timesheet,
    },
    NeedsAttention {
        timesheet: Timesheet,
        reason: String,
    },
    NewSubmission {
        timesheet: Timesheet,
    },
}

impl NotificationRequest {
    pub fn timesheet(&self) -> &Timesheet {
        match self {
            NotificationRequest::Approved { timesheet }
            | NotificationRequest::NeedsAttention { timesheet, .. }
            | NotificationRequest::NewSubmission { timesheet } => timesheet,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            NotificationRequest::Approved { .. } => "approved",
            NotificationRequest::NeedsAttention { .. } => "needs_attention",
            NotificationRequest::NewSubmission { .. } => "new_submission",
        }
    }
}

/// 基于有界 mpsc 通道的分发器
///
/// 使用 `try_send`，队列满或 worker 已退出时丢弃并记录日志，
/// 不阻塞请求处理。
#[derive(Debug, Clone)]
pub struct NotificationService {
    tx: mpsc::Sender<NotificationRequest>,
}

impl NotificationService {
    pub fn new(buffer_size: usize) -> (Self, mpsc::Receiver<NotificationRequest>) {
        let (tx, rx) = mpsc::channel(buffer_size.max(1));
        (Self { tx }, rx)
    }

    fn enqueue(&self, req: NotificationRequest) {
        let kind = req.name();
        let timesheet_id = req.timesheet().id;
        match self.tx.try_send(req) {
            Ok(()) => {
                tracing::debug!(timesheet_id, kind, "Notification queued");
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(timesheet_id, kind, "Notification queue full, dropping notification");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::warn!(timesheet_id, kind, "Notification worker stopped, dropping notification");
            }
        }
    }
}

impl NotificationDispatcher for NotificationService {
    fn notify_approved(&self, timesheet: &Timesheet) {
        self.enqueue(NotificationRequest::Approved {
            timesheet: timesheet.clone(),
        });
    }

    fn notify_needs_attention(&self, timesheet: &Timesheet, reason: &str) {
        self.enqueue(NotificationRequest::NeedsAttention {
            timesheet: timesheet.clone(),
            reason: reason.to_string(),
        });
    }

    fn notify_admin_new_submission(&self, timesheet: &Timesheet) {
        self.enqueue(NotificationRequest::NewSubmission {
            timesheet: timesheet.clone(),
        });
    }
}
