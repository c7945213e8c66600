//! Timesheet API Module (owner side)

mod handler;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/timesheets", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route("/{id}/entries", put(handler::replace_entries))
        .route("/{id}/submit", post(handler::submit))
        .route("/{id}/attachments", post(handler::upload_attachment))
        .route(
            "/{id}/attachments/{attachment_id}",
            delete(handler::delete_attachment),
        )
        .route("/{id}/notes", post(handler::add_note))
}
