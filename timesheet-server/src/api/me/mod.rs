//! Current user API Module

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/me", get(handler::me))
        .route("/api/me/settings", put(handler::update_settings))
        .route("/api/hour-types", get(handler::hour_types))
        .route("/api/notifications", get(handler::notifications))
}
