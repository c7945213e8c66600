use std::path::Path;
use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::JwtService;
use crate::core::{Config, Result};
use crate::db::DbService;
use crate::notify::{NotificationDispatcher, NotificationService, NotificationWorker};
use crate::pay_periods::{Calendar, PayPeriodService};
use crate::timesheets::TimesheetService;
use crate::users::UserService;

/// 服务器状态 - 持有所有服务的共享引用
///
/// `ServerState` 是 HTTP handler 的共享状态，克隆开销很小 (内部全是
/// 连接池句柄和 `Arc`)。
///
/// # 组件
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 服务器配置 |
/// | pool | SQLite 连接池 |
/// | jwt_service | JWT 令牌校验 |
/// | timesheets | 工时表 (本人 + 审核) |
/// | pay_periods | 发薪周期 |
/// | users | 用户管理 |
#[derive(Clone, Debug)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    pub pool: SqlitePool,
    /// JWT 认证服务 (Arc 共享所有权)
    pub jwt_service: Arc<JwtService>,
    pub timesheets: TimesheetService,
    pub pay_periods: PayPeriodService,
    pub users: UserService,
}

impl ServerState {
    /// 手动构造 (测试中可注入自定义通知分发器)
    pub fn new(config: Config, pool: SqlitePool, notifier: Arc<dyn NotificationDispatcher>) -> Self {
        let calendar = Calendar::new(config.week_start_day, config.pay_period_start_day);
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        Self {
            timesheets: TimesheetService::new(pool.clone(), &config, notifier),
            pay_periods: PayPeriodService::new(pool.clone(), calendar),
            users: UserService::new(pool.clone()),
            jwt_service,
            pool,
            config,
        }
    }

    /// 初始化服务器状态
    ///
    /// 1. 创建工作目录和附件目录
    /// 2. 打开数据库并执行迁移
    /// 3. 启动通知 worker
    pub async fn initialize(config: &Config) -> Result<Self> {
        ensure_dir(Path::new(&config.work_dir))?;
        ensure_dir(Path::new(&config.upload_dir))?;

        let db = DbService::new(&config.database_path).await?;

        let (notifier, rx) = NotificationService::new(config.notification_buffer);
        tokio::spawn(NotificationWorker::new(db.pool.clone()).run(rx));

        Ok(Self::new(config.clone(), db.pool, Arc::new(notifier)))
    }
}

fn ensure_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path)?;
    Ok(())
}
