//! 工时表模块
//!
//! - [`lifecycle`] - 状态转移表 (纯函数)
//! - [`completeness`] - 提交时的附件 / 收据完整性检查
//! - [`totals`] - 工时与报销汇总 (Decimal)
//! - [`TimesheetService`] - 本人操作与审核操作

pub mod completeness;
pub mod lifecycle;
pub mod service;
pub mod totals;

pub use lifecycle::{InvalidTransition, LifecycleEvent, Outcome};
pub use service::{AttachmentUpload, TimesheetService};
