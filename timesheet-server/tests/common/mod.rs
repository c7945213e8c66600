//! 集成测试公共设施: 内存数据库 + 临时附件目录 + 记录型通知分发器

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use shared::models::{Role, Timesheet, User, UserCreate};
use tempfile::TempDir;
use timesheet_server::auth::JwtConfig;
use timesheet_server::db::DbService;
use timesheet_server::db::repository::user;
use timesheet_server::notify::NotificationDispatcher;
use timesheet_server::{ActingUser, Config, ServerState};

/// 记录下来的通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Approved { timesheet_id: i64 },
    NeedsAttention { timesheet_id: i64, reason: String },
    NewSubmission { timesheet_id: i64 },
}

#[derive(Debug, Default)]
pub struct RecordingDispatcher {
    sent: Mutex<Vec<Sent>>,
}

impl RecordingDispatcher {
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    fn push(&self, sent: Sent) {
        self.sent.lock().unwrap().push(sent);
    }
}

impl NotificationDispatcher for RecordingDispatcher {
    fn notify_approved(&self, timesheet: &Timesheet) {
        self.push(Sent::Approved {
            timesheet_id: timesheet.id,
        });
    }

    fn notify_needs_attention(&self, timesheet: &Timesheet, reason: &str) {
        self.push(Sent::NeedsAttention {
            timesheet_id: timesheet.id,
            reason: reason.to_string(),
        });
    }

    fn notify_admin_new_submission(&self, timesheet: &Timesheet) {
        self.push(Sent::NewSubmission {
            timesheet_id: timesheet.id,
        });
    }
}

pub struct TestApp {
    pub state: ServerState,
    pub dispatcher: Arc<RecordingDispatcher>,
    // 保持临时目录直到测试结束
    _dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new(
            dir.path().to_string_lossy().into_owned(),
            JwtConfig::with_secret("integration-test-secret-with-enough-length"),
        );
        std::fs::create_dir_all(&config.upload_dir).unwrap();

        let db = DbService::in_memory().await.unwrap();
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let state = ServerState::new(config, db.pool, dispatcher.clone());

        Self {
            state,
            dispatcher,
            _dir: dir,
        }
    }

    /// 创建用户并返回 (用户, 执行者)
    pub async fn user(&self, email: &str, role: Role) -> (User, ActingUser) {
        let created = user::create(
            &self.state.pool,
            &UserCreate {
                email: email.into(),
                display_name: email.split('@').next().unwrap_or(email).into(),
                role,
                notifications_enabled: true,
            },
        )
        .await
        .unwrap();
        let actor = ActingUser {
            id: created.id,
            role,
        };
        (created, actor)
    }

    /// 直接写入任意角色字符串 (模拟历史数据中的未知角色)
    pub async fn set_raw_role(&self, user_id: i64, role: &str) {
        sqlx::query("UPDATE app_user SET role = ? WHERE id = ?")
            .bind(role)
            .bind(user_id)
            .execute(&self.state.pool)
            .await
            .unwrap();
    }

    pub fn token(&self, user: &User, role: &str) -> String {
        self.state
            .jwt_service
            .generate_token(user.id, &user.display_name, role)
            .unwrap()
    }

    pub fn upload_dir_entries(&self) -> usize {
        std::fs::read_dir(&self.state.config.upload_dir)
            .map(|dir| dir.count())
            .unwrap_or(0)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// 最小的合法 PDF 内容
pub const PDF_BYTES: &[u8] = b"%PDF-1.4\n%test\n";
