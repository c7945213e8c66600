//! User API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use shared::models::{User, UserCreate, UserRoleUpdate};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::AppResult;

/// GET /api/users
pub async fn list(State(state): State<ServerState>, user: CurrentUser) -> AppResult<Json<Vec<User>>> {
    let users = state.users.list_users(&user.acting()).await?;
    Ok(Json(users))
}

/// POST /api/users
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<UserCreate>,
) -> AppResult<(StatusCode, Json<User>)> {
    let created = state.users.create_user(&user.acting(), &payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/users/{id}/role
pub async fn update_role(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<UserRoleUpdate>,
) -> AppResult<Json<User>> {
    let updated = state
        .users
        .update_role(&user.acting(), id, payload.role)
        .await?;
    Ok(Json(updated))
}
