//! Timesheet Server - 周工时表审批服务
//!
//! # 架构概述
//!
//! 员工按周提交工时表，审批人/管理员审核后批准或退回，
//! 管理员确认发薪周期后该周期内的工时表全部锁定。
//!
//! - **授权策略** (`auth::policy`): 角色 → 可填工时类型 / 可审批角色
//! - **状态机** (`timesheets::lifecycle`): NEW → SUBMITTED / NEEDS_APPROVAL → APPROVED
//! - **完整性检查** (`timesheets::completeness`): 提交时决定是否需要补充附件
//! - **发薪周期锁** (`pay_periods`): 确认后的 14 天周期禁止任何修改
//! - **通知** (`notify`): 状态变更后异步写入通知 outbox
//!
//! # 模块结构
//!
//! ```text
//! timesheet-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # JWT 认证、授权策略
//! ├── db/            # SQLite 连接池和 repository
//! ├── timesheets/    # 状态机、完整性检查、工时汇总、服务
//! ├── pay_periods/   # 周历计算、发薪周期锁、确认
//! ├── notify/        # 通知分发 trait + 后台 worker
//! ├── storage/       # 附件文件存储和类型校验
//! ├── users/         # 用户管理
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 日志、校验、日期工具
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod notify;
pub mod pay_periods;
pub mod storage;
pub mod timesheets;
pub mod users;
pub mod utils;

// Re-export 公共类型
pub use auth::{ActingUser, AuthorizationPolicy, CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// 设置运行环境: 加载 .env、初始化日志
pub fn setup_environment() {
    dotenv::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into());
    let log_json = std::env::var("LOG_JSON")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(false);
    let log_dir = std::env::var("LOG_DIR").ok();

    init_logger_with_file(Some(&log_level), Some(log_json), log_dir.as_deref());
}

pub fn print_banner() {
    println!(
        r#"
 _______                   __               __
/_  __(_)___ ___  ___  ___/ /  ___ ___ / /_
 / / / / __ `__ \/ -_|_-</ _ \/ -_) -_) __/
/_/ /_/_/ /_/ /_/\__/___/_//_/\__/\__/\__/
    "#
    );
}
