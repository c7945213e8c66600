//! Data models
//!
//! Shared between timesheet-server and its clients (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` snowflakes, dates are `NaiveDate`, timestamps are Unix millis.

pub mod attachment;
pub mod entry;
pub mod hour_type;
pub mod note;
pub mod notification;
pub mod patch;
pub mod pay_period;
pub mod reimbursement;
pub mod role;
pub mod timesheet;
pub mod user;

// Re-exports
pub use attachment::*;
pub use entry::*;
pub use hour_type::*;
pub use note::*;
pub use notification::*;
pub use patch::Patch;
pub use pay_period::*;
pub use reimbursement::*;
pub use role::*;
pub use timesheet::*;
pub use user::*;
