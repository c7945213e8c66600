//! Reimbursement Model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
pub enum ReimbursementType {
    Car,
    Flight,
    Food,
    Other,
}

impl ReimbursementType {
    pub const ALL: [ReimbursementType; 4] = [
        ReimbursementType::Car,
        ReimbursementType::Flight,
        ReimbursementType::Food,
        ReimbursementType::Other,
    ];

    /// Mileage claims carry no receipt
    pub const fn requires_receipt(&self) -> bool {
        match self {
            ReimbursementType::Car => false,
            ReimbursementType::Flight | ReimbursementType::Food | ReimbursementType::Other => true,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            ReimbursementType::Car => "Car",
            ReimbursementType::Flight => "Flight",
            ReimbursementType::Food => "Food",
            ReimbursementType::Other => "Other",
        }
    }
}

impl FromStr for ReimbursementType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReimbursementType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown reimbursement type: {s}"))
    }
}

impl fmt::Display for ReimbursementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ReimbursementItem {
    pub id: i64,
    pub timesheet_id: i64,
    pub reimbursement_type: ReimbursementType,
    pub amount: f64,
    pub expense_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReimbursementItemInput {
    pub reimbursement_type: ReimbursementType,
    pub amount: f64,
    pub expense_date: Option<NaiveDate>,
    pub notes: Option<String>,
}
