//! Pay Period Model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Confirmed 14-day pay period (immutable once created)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PayPeriod {
    pub id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub confirmed_at: i64,
    pub confirmed_by: i64,
}

/// Confirm pay period payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayPeriodConfirm {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Status query params / response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayPeriodRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayPeriodStatus {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub confirmed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pay_period: Option<PayPeriod>,
}
