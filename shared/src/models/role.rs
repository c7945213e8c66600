//! Role Model
//!
//! Roles are ordered by permission level (trainee lowest, admin highest).
//! Legacy role names `staff` and `support` are accepted on input and map to
//! `internal` and `approver`. Anything else is rejected, never defaulted.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// User role (exactly one per user)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Trainee,
    #[serde(alias = "staff")]
    Internal,
    Engineer,
    #[serde(alias = "support")]
    Approver,
    Admin,
}

/// Role string that is neither a canonical name nor a legacy alias
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Trainee,
        Role::Internal,
        Role::Engineer,
        Role::Approver,
        Role::Admin,
    ];

    /// Canonical lowercase name (what gets stored)
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Trainee => "trainee",
            Role::Internal => "internal",
            Role::Engineer => "engineer",
            Role::Approver => "approver",
            Role::Admin => "admin",
        }
    }

    /// Ordered permission level, 1 (trainee) to 5 (admin)
    pub const fn level(&self) -> u8 {
        match self {
            Role::Trainee => 1,
            Role::Internal => 2,
            Role::Engineer => 3,
            Role::Approver => 4,
            Role::Admin => 5,
        }
    }

    /// Every stored spelling that parses to this role
    pub const fn stored_names(&self) -> &'static [&'static str] {
        match self {
            Role::Trainee => &["trainee"],
            Role::Internal => &["internal", "staff"],
            Role::Engineer => &["engineer"],
            Role::Approver => &["approver", "support"],
            Role::Admin => &["admin"],
        }
    }

    /// Approver or admin
    pub const fn is_reviewer(&self) -> bool {
        matches!(self, Role::Approver | Role::Admin)
    }

    /// Strict parse: canonical names and legacy aliases, case-insensitive
    pub fn parse(value: &str) -> Result<Self, UnknownRole> {
        match value.trim().to_ascii_lowercase().as_str() {
            "trainee" => Ok(Role::Trainee),
            "internal" | "staff" => Ok(Role::Internal),
            "engineer" => Ok(Role::Engineer),
            "approver" | "support" => Ok(Role::Approver),
            "admin" => Ok(Role::Admin),
            _ => Err(UnknownRole(value.to_string())),
        }
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::parse(s)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
