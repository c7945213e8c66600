use chrono::Weekday;
use std::path::PathBuf;
use std::str::FromStr;

use crate::auth::JwtConfig;
use crate::core::{Result, ServerError};
use crate::utils::time::parse_weekday;

/// 服务器配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 (数据库、附件) |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | DATABASE_PATH | {WORK_DIR}/timesheets.db | SQLite 文件 |
/// | UPLOAD_DIR | {WORK_DIR}/uploads | 附件存储目录 |
/// | MAX_UPLOAD_BYTES | 16777216 | 单个附件大小上限 |
/// | MAX_CONNECTIONS | 1000 | 最大并发请求数 |
/// | WEEK_START_DAY | sun | 工时周起始日 |
/// | PAY_PERIOD_START_DAY | mon | 发薪周期起始日 |
/// | NOTIFICATION_BUFFER | 256 | 通知队列容量 |
/// | REVIEW_PAGE_SIZE | 20 | 审核列表默认分页大小 |
/// | ENVIRONMENT | development | 运行环境 |
///
/// JWT 相关变量见 [`JwtConfig::from_env`]。
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/srv/timesheets HTTP_PORT=8080 WEEK_START_DAY=mon cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    pub database_path: String,
    pub upload_dir: String,
    pub max_upload_bytes: usize,
    pub max_connections: usize,
    /// 工时周起始日 (week_start 一律归一到这一天)
    pub week_start_day: Weekday,
    /// 发薪周期起始日 (确认周期的 start_date 必须落在这一天)
    pub pay_period_start_day: Weekday,
    pub notification_buffer: usize,
    pub review_page_size: u32,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    /// 运行环境: development | staging | production
    pub environment: String,
}

impl Config {
    /// 默认配置 (不读取环境变量)，常用于测试
    pub fn new(work_dir: impl Into<String>, jwt: JwtConfig) -> Self {
        let work_dir = work_dir.into();
        let root = PathBuf::from(&work_dir);
        Self {
            database_path: root.join("timesheets.db").to_string_lossy().into_owned(),
            upload_dir: root.join("uploads").to_string_lossy().into_owned(),
            work_dir,
            http_port: 3000,
            max_upload_bytes: 16 * 1024 * 1024,
            max_connections: 1000,
            week_start_day: Weekday::Sun,
            pay_period_start_day: Weekday::Mon,
            notification_buffer: 256,
            review_page_size: 20,
            jwt,
            environment: "development".into(),
        }
    }

    /// 从环境变量加载配置
    ///
    /// 未设置的变量使用默认值；无法解析的星期回退到默认值并打印警告。
    pub fn from_env() -> Result<Self> {
        let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into());
        let jwt = JwtConfig::from_env()?;
        let mut config = Self::new(work_dir, jwt);

        if let Ok(path) = std::env::var("DATABASE_PATH") {
            config.database_path = path;
        }
        if let Ok(dir) = std::env::var("UPLOAD_DIR") {
            config.upload_dir = dir;
        }
        config.http_port = env_or("HTTP_PORT", config.http_port);
        config.max_upload_bytes = env_or("MAX_UPLOAD_BYTES", config.max_upload_bytes);
        config.max_connections = env_or("MAX_CONNECTIONS", config.max_connections);
        config.week_start_day = weekday_or("WEEK_START_DAY", config.week_start_day);
        config.pay_period_start_day = weekday_or("PAY_PERIOD_START_DAY", config.pay_period_start_day);
        config.notification_buffer = env_or("NOTIFICATION_BUFFER", config.notification_buffer);
        config.review_page_size = env_or("REVIEW_PAGE_SIZE", config.review_page_size);
        config.environment =
            std::env::var("ENVIRONMENT").unwrap_or_else(|_| config.environment.clone());

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.max_upload_bytes == 0 {
            return Err(ServerError::Config("MAX_UPLOAD_BYTES must be positive".into()));
        }
        if self.notification_buffer == 0 {
            return Err(ServerError::Config("NOTIFICATION_BUFFER must be positive".into()));
        }
        if self.review_page_size == 0 || self.review_page_size > 100 {
            return Err(ServerError::Config("REVIEW_PAGE_SIZE must be within 1..=100".into()));
        }
        if self.max_connections == 0 {
            return Err(ServerError::Config("MAX_CONNECTIONS must be positive".into()));
        }
        Ok(())
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn weekday_or(key: &str, default: Weekday) -> Weekday {
    match std::env::var(key) {
        Ok(raw) => parse_weekday(&raw).unwrap_or_else(|| {
            tracing::warn!(key, value = %raw, fallback = %default, "Unparsable weekday, using default");
            default
        }),
        Err(_) => default,
    }
}
