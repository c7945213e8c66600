//! Timesheet API Handlers

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use shared::models::{
    Attachment, EntriesReplace, Note, NoteCreate, ReimbursementType, Timesheet, TimesheetCreate,
    TimesheetDetail, TimesheetListQuery, TimesheetUpdate,
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::timesheets::AttachmentUpload;
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode};

/// GET /api/timesheets - 本人工时表列表
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<TimesheetListQuery>,
) -> AppResult<Json<Vec<Timesheet>>> {
    let list = state.timesheets.list_own(&user.acting(), query.status).await?;
    Ok(Json(list))
}

/// POST /api/timesheets - 创建工时表
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<TimesheetCreate>,
) -> AppResult<(StatusCode, Json<TimesheetDetail>)> {
    let detail = state.timesheets.create(&user.acting(), &payload).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// GET /api/timesheets/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<TimesheetDetail>> {
    let detail = state.timesheets.get(&user.acting(), id).await?;
    Ok(Json(detail))
}

/// PUT /api/timesheets/{id} - 修改本人字段
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<TimesheetUpdate>,
) -> AppResult<Json<TimesheetDetail>> {
    let detail = state.timesheets.update(&user.acting(), id, payload).await?;
    Ok(Json(detail))
}

/// DELETE /api/timesheets/{id} - 仅 NEW
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<()>> {
    state.timesheets.delete(&user.acting(), id).await?;
    Ok(ApiResponse::ok_with_message("Timesheet deleted"))
}

/// PUT /api/timesheets/{id}/entries - 整体替换工时条目
pub async fn replace_entries(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<EntriesReplace>,
) -> AppResult<Json<TimesheetDetail>> {
    let detail = state
        .timesheets
        .replace_entries(&user.acting(), id, payload.entries)
        .await?;
    Ok(Json(detail))
}

/// POST /api/timesheets/{id}/submit
pub async fn submit(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<TimesheetDetail>> {
    let detail = state.timesheets.submit(&user.acting(), id).await?;
    Ok(Json(detail))
}

/// POST /api/timesheets/{id}/attachments - multipart: `file`, 可选 `reimbursement_type`
pub async fn upload_attachment(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<Attachment>)> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut reimbursement_type: Option<ReimbursementType> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Invalid multipart request: {}", e)))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "file" => {
                let name = field.file_name().unwrap_or_default().to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::validation(format!("Multipart error: {}", e)))?;
                file = Some((name, data.to_vec()));
            }
            "reimbursement_type" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::validation(format!("Multipart error: {}", e)))?;
                if !text.trim().is_empty() {
                    let parsed = text
                        .parse::<ReimbursementType>()
                        .map_err(|e| AppError::validation(e).with_detail("field", "reimbursement_type"))?;
                    reimbursement_type = Some(parsed);
                }
            }
            _ => {}
        }
    }

    let (original_name, data) = file.ok_or_else(|| AppError::new(ErrorCode::NoFileProvided))?;
    let saved = state
        .timesheets
        .upload_attachment(
            &user.acting(),
            id,
            AttachmentUpload {
                original_name,
                data,
                reimbursement_type,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

/// DELETE /api/timesheets/{id}/attachments/{attachment_id} - 仅 NEW
pub async fn delete_attachment(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path((id, attachment_id)): Path<(i64, i64)>,
) -> AppResult<ApiResponse<()>> {
    state
        .timesheets
        .delete_attachment(&user.acting(), id, attachment_id)
        .await?;
    Ok(ApiResponse::ok_with_message("Attachment deleted"))
}

/// POST /api/timesheets/{id}/notes - 追加历史备注
pub async fn add_note(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<NoteCreate>,
) -> AppResult<(StatusCode, Json<Note>)> {
    let note = state
        .timesheets
        .add_note(&user.acting(), id, &payload.content)
        .await?;
    Ok((StatusCode::CREATED, Json(note)))
}
