//! Review API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use shared::PaginatedResponse;
use shared::models::{
    AdminNotesUpdate, RejectRequest, ReviewItem, ReviewQuery, Timesheet, TimesheetDetail,
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::AppResult;

/// GET /api/review/timesheets - 审核队列 (分页)
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<ReviewQuery>,
) -> AppResult<Json<PaginatedResponse<ReviewItem>>> {
    let page = state.timesheets.list_for_review(&user.acting(), &query).await?;
    Ok(Json(page))
}

/// GET /api/review/timesheets/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<TimesheetDetail>> {
    let detail = state.timesheets.get_for_review(&user.acting(), id).await?;
    Ok(Json(detail))
}

/// POST /api/review/timesheets/{id}/approve
pub async fn approve(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Timesheet>> {
    let ts = state.timesheets.approve(&user.acting(), id).await?;
    Ok(Json(ts))
}

/// POST /api/review/timesheets/{id}/reject - 退回并说明原因
pub async fn reject(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<RejectRequest>,
) -> AppResult<Json<Timesheet>> {
    let ts = state
        .timesheets
        .reject(&user.acting(), id, &payload.reason)
        .await?;
    Ok(Json(ts))
}

/// POST /api/review/timesheets/{id}/unapprove
pub async fn unapprove(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Timesheet>> {
    let ts = state.timesheets.unapprove(&user.acting(), id).await?;
    Ok(Json(ts))
}

/// PUT /api/review/timesheets/{id}/admin-notes
pub async fn set_admin_notes(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<AdminNotesUpdate>,
) -> AppResult<Json<Timesheet>> {
    let ts = state
        .timesheets
        .set_admin_notes(&user.acting(), id, payload.admin_notes)
        .await?;
    Ok(Json(ts))
}
