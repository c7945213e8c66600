//! Current user API Handlers

use axum::{Json, extract::State};
use shared::models::{HourTypeInfo, Notification, User, UserSettingsUpdate};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::AppResult;

/// GET /api/me - 当前用户
pub async fn me(State(state): State<ServerState>, user: CurrentUser) -> AppResult<Json<User>> {
    let profile = state.users.me(&user.acting()).await?;
    Ok(Json(profile))
}

/// PUT /api/me/settings - 本人通知开关
pub async fn update_settings(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<UserSettingsUpdate>,
) -> AppResult<Json<User>> {
    let updated = state.users.update_settings(&user.acting(), &payload).await?;
    Ok(Json(updated))
}

/// GET /api/hour-types - 当前角色可填的工时类型
pub async fn hour_types(State(state): State<ServerState>, user: CurrentUser) -> Json<Vec<HourTypeInfo>> {
    Json(state.users.allowed_hour_types(&user.acting()))
}

/// GET /api/notifications - 本人通知 (最新在前)
pub async fn notifications(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<Notification>>> {
    let list = state.users.list_notifications(&user.acting()).await?;
    Ok(Json(list))
}
