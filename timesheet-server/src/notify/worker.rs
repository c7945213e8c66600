//! 通知后台 Worker
//!
//! 从 mpsc 通道消费 [`NotificationRequest`]，解析收件人并写入
//! `notification` outbox。通道关闭时退出。

use shared::models::{NotificationKind, User};
use sqlx::SqlitePool;

use super::{NotificationRequest, message};
use crate::db::repository::{RepoResult, notification, user};

pub struct NotificationWorker {
    pool: SqlitePool,
}

impl NotificationWorker {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// 运行 worker（阻塞直到通道关闭）
    pub async fn run(self, mut rx: tokio::sync::mpsc::Receiver<NotificationRequest>) {
        tracing::info!("📨 Notification worker started");

        while let Some(req) = rx.recv().await {
            let timesheet_id = req.timesheet().id;
            match self.handle(req).await {
                Ok(count) => {
                    tracing::debug!(timesheet_id, recipients = count, "Notification persisted");
                }
                Err(e) => {
                    tracing::error!(timesheet_id, "Failed to persist notification: {:?}", e);
                }
            }
        }

        tracing::info!("Notification channel closed, worker stopping");
    }

    /// 写入 outbox，返回收件人数量
    pub async fn handle(&self, req: NotificationRequest) -> RepoResult<usize> {
        let timesheet = req.timesheet();
        let (kind, text, recipients) = match &req {
            NotificationRequest::Approved { timesheet } => (
                NotificationKind::Approved,
                message::approved(timesheet.week_start),
                self.owner(timesheet.user_id).await?,
            ),
            NotificationRequest::NeedsAttention { timesheet, reason } => (
                NotificationKind::NeedsAttention,
                message::needs_attention(timesheet.week_start, reason),
                self.owner(timesheet.user_id).await?,
            ),
            NotificationRequest::NewSubmission { timesheet } => {
                let owner_name = user::find_by_id(&self.pool, timesheet.user_id)
                    .await?
                    .map(|u| u.display_name)
                    .unwrap_or_else(|| format!("User {}", timesheet.user_id));
                (
                    NotificationKind::NewSubmission,
                    message::new_submission(&owner_name, timesheet.week_start),
                    user::find_notifiable_admins(&self.pool).await?,
                )
            }
        };

        for recipient in &recipients {
            notification::insert(&self.pool, recipient.id, Some(timesheet.id), kind, &text).await?;
        }
        Ok(recipients.len())
    }

    /// 工时表本人 (关闭通知的用户不发送)
    async fn owner(&self, user_id: i64) -> RepoResult<Vec<User>> {
        Ok(user::find_by_id(&self.pool, user_id)
            .await?
            .filter(|u| u.notifications_enabled)
            .into_iter()
            .collect())
    }
}
