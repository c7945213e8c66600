//! Hour Type Model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Billing properties of an hour type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourTypeFlags {
    pub payable: bool,
    pub billable: bool,
    pub requires_attachment: bool,
}

/// Kind of hours recorded on a timesheet entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
pub enum HourType {
    Field,
    Internal,
    Training,
    #[serde(rename = "PTO")]
    #[cfg_attr(feature = "db", sqlx(rename = "PTO"))]
    Pto,
    Unpaid,
    Holiday,
}

impl HourType {
    pub const ALL: [HourType; 6] = [
        HourType::Field,
        HourType::Internal,
        HourType::Training,
        HourType::Pto,
        HourType::Unpaid,
        HourType::Holiday,
    ];

    pub const fn flags(&self) -> HourTypeFlags {
        match self {
            HourType::Field => HourTypeFlags {
                payable: true,
                billable: true,
                requires_attachment: true,
            },
            HourType::Internal | HourType::Pto | HourType::Holiday => HourTypeFlags {
                payable: true,
                billable: false,
                requires_attachment: false,
            },
            HourType::Training | HourType::Unpaid => HourTypeFlags {
                payable: false,
                billable: false,
                requires_attachment: false,
            },
        }
    }

    pub const fn is_payable(&self) -> bool {
        self.flags().payable
    }

    pub const fn is_billable(&self) -> bool {
        self.flags().billable
    }

    pub const fn requires_attachment(&self) -> bool {
        self.flags().requires_attachment
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            HourType::Field => "Field",
            HourType::Internal => "Internal",
            HourType::Training => "Training",
            HourType::Pto => "PTO",
            HourType::Unpaid => "Unpaid",
            HourType::Holiday => "Holiday",
        }
    }
}

impl FromStr for HourType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HourType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown hour type: {s}"))
    }
}

impl fmt::Display for HourType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hour type with its flags, as listed to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HourTypeInfo {
    pub hour_type: HourType,
    #[serde(flatten)]
    pub flags: HourTypeFlags,
}

impl From<HourType> for HourTypeInfo {
    fn from(hour_type: HourType) -> Self {
        Self {
            hour_type,
            flags: hour_type.flags(),
        }
    }
}
