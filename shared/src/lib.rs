//! Shared types for the timesheet service
//!
//! Error codes and response envelopes, domain models, pagination and
//! id/time helpers used by the server and its tests.

pub mod error;
pub mod models;
pub mod response;
pub mod util;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};

pub use response::{PaginatedResponse, Pagination};
