//! Pay Period API Handlers

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use shared::models::{PayPeriod, PayPeriodConfirm, PayPeriodRange, PayPeriodStatus};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::AppResult;

/// GET /api/pay-periods - 已确认周期 (最新在前)
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<PayPeriod>>> {
    let list = state.pay_periods.list(&user.acting()).await?;
    Ok(Json(list))
}

/// GET /api/pay-periods/status?start_date=&end_date=
pub async fn status(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(range): Query<PayPeriodRange>,
) -> AppResult<Json<PayPeriodStatus>> {
    let status = state
        .pay_periods
        .status(&user.acting(), range.start_date, range.end_date)
        .await?;
    Ok(Json(status))
}

/// POST /api/pay-periods - 确认并锁定周期
pub async fn confirm(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<PayPeriodConfirm>,
) -> AppResult<(StatusCode, Json<PayPeriod>)> {
    let period = state
        .pay_periods
        .confirm(&user.acting(), payload.start_date, payload.end_date)
        .await?;
    Ok((StatusCode::CREATED, Json(period)))
}
