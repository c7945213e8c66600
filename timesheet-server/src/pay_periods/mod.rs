//! 发薪周期模块
//!
//! - [`Calendar`] - 工时周 / 发薪周期的日历计算
//! - [`lock`] - 周期锁: 已确认周期内的工时表禁止任何修改
//! - [`PayPeriodService`] - 周期查询与确认 (仅管理员)

pub mod calendar;
pub mod lock;
pub mod service;

pub use calendar::{Calendar, PAY_PERIOD_DAYS};
pub use service::PayPeriodService;
