//! Unified error codes for the timesheet service
//!
//! This module defines all error codes used by timesheet-server and its clients.
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Timesheet errors
//! - 4xxx: Pay period errors
//! - 5xxx: Attachment errors
//! - 6xxx: User errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Approver or admin role required
    ReviewerRequired = 2002,
    /// Admin role required
    AdminRequired = 2003,
    /// Role string is not recognized
    UnknownRole = 2004,
    /// Hour type is not allowed for the role
    HourTypeNotAllowed = 2005,
    /// Actor may not review timesheets owned by this role
    CannotReviewRole = 2006,

    // ==================== 3xxx: Timesheet ====================
    /// Timesheet not found
    TimesheetNotFound = 3001,
    /// Timesheet already exists for this week
    TimesheetExists = 3002,
    /// Transition is not legal from the current status
    InvalidStatus = 3003,
    /// Week falls inside a confirmed pay period
    PeriodLocked = 3004,
    /// Entry date is outside the timesheet week
    EntryOutsideWeek = 3005,

    // ==================== 4xxx: Pay Period ====================
    /// Pay period does not start on the boundary weekday
    PayPeriodInvalidStart = 4001,
    /// Pay period does not span 14 days
    PayPeriodInvalidLength = 4002,
    /// Pay period already confirmed
    PayPeriodAlreadyConfirmed = 4003,
    /// Pay period overlaps a confirmed period
    PayPeriodOverlap = 4004,
    /// Pay period still has unapproved timesheets
    PayPeriodHasPending = 4005,

    // ==================== 5xxx: Attachment ====================
    /// Attachment not found
    AttachmentNotFound = 5001,
    /// File too large
    FileTooLarge = 5002,
    /// Unsupported file format
    UnsupportedFileFormat = 5003,
    /// File content does not match its extension
    FileContentMismatch = 5004,
    /// No file provided in request
    NoFileProvided = 5005,
    /// Empty file provided
    EmptyFile = 5006,
    /// File storage failed
    FileStorageFailed = 5007,

    // ==================== 6xxx: User ====================
    /// User not found
    UserNotFound = 6001,
    /// Email already registered
    UserEmailExists = 6002,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::ReviewerRequired => "Approver or administrator role is required",
            ErrorCode::AdminRequired => "Administrator role is required",
            ErrorCode::UnknownRole => "Unrecognized role",
            ErrorCode::HourTypeNotAllowed => "Hour type is not allowed for this role",
            ErrorCode::CannotReviewRole => "Not allowed to review timesheets for this role",

            // Timesheet
            ErrorCode::TimesheetNotFound => "Timesheet not found",
            ErrorCode::TimesheetExists => "Timesheet already exists for this week",
            ErrorCode::InvalidStatus => "Operation is not allowed in the current status",
            ErrorCode::PeriodLocked => "Pay period is locked",
            ErrorCode::EntryOutsideWeek => "Entry date is outside the timesheet week",

            // Pay period
            ErrorCode::PayPeriodInvalidStart => "Pay period starts on the wrong weekday",
            ErrorCode::PayPeriodInvalidLength => "Pay period must span 14 days",
            ErrorCode::PayPeriodAlreadyConfirmed => "Pay period already confirmed",
            ErrorCode::PayPeriodOverlap => "Pay period overlaps a confirmed pay period",
            ErrorCode::PayPeriodHasPending => "All timesheets must be approved",

            // Attachment
            ErrorCode::AttachmentNotFound => "Attachment not found",
            ErrorCode::FileTooLarge => "File too large",
            ErrorCode::UnsupportedFileFormat => "Unsupported file format",
            ErrorCode::FileContentMismatch => "File content does not match its type",
            ErrorCode::NoFileProvided => "No file provided",
            ErrorCode::EmptyFile => "Empty file provided",
            ErrorCode::FileStorageFailed => "File storage failed",

            // User
            ErrorCode::UserNotFound => "User not found",
            ErrorCode::UserEmailExists => "Email is already registered",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::ReviewerRequired),
            2003 => Ok(ErrorCode::AdminRequired),
            2004 => Ok(ErrorCode::UnknownRole),
            2005 => Ok(ErrorCode::HourTypeNotAllowed),
            2006 => Ok(ErrorCode::CannotReviewRole),

            // Timesheet
            3001 => Ok(ErrorCode::TimesheetNotFound),
            3002 => Ok(ErrorCode::TimesheetExists),
            3003 => Ok(ErrorCode::InvalidStatus),
            3004 => Ok(ErrorCode::PeriodLocked),
            3005 => Ok(ErrorCode::EntryOutsideWeek),

            // Pay period
            4001 => Ok(ErrorCode::PayPeriodInvalidStart),
            4002 => Ok(ErrorCode::PayPeriodInvalidLength),
            4003 => Ok(ErrorCode::PayPeriodAlreadyConfirmed),
            4004 => Ok(ErrorCode::PayPeriodOverlap),
            4005 => Ok(ErrorCode::PayPeriodHasPending),

            // Attachment
            5001 => Ok(ErrorCode::AttachmentNotFound),
            5002 => Ok(ErrorCode::FileTooLarge),
            5003 => Ok(ErrorCode::UnsupportedFileFormat),
            5004 => Ok(ErrorCode::FileContentMismatch),
            5005 => Ok(ErrorCode::NoFileProvided),
            5006 => Ok(ErrorCode::EmptyFile),
            5007 => Ok(ErrorCode::FileStorageFailed),

            // User
            6001 => Ok(ErrorCode::UserNotFound),
            6002 => Ok(ErrorCode::UserEmailExists),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::TimesheetNotFound.code(), 3001);
        assert_eq!(ErrorCode::PeriodLocked.code(), 3004);
        assert_eq!(ErrorCode::PayPeriodHasPending.code(), 4005);
    }

    #[test]
    fn test_try_from_valid() {
        assert_eq!(ErrorCode::try_from(0), Ok(ErrorCode::Success));
        assert_eq!(ErrorCode::try_from(1001), Ok(ErrorCode::NotAuthenticated));
        assert_eq!(ErrorCode::try_from(2004), Ok(ErrorCode::UnknownRole));
        assert_eq!(ErrorCode::try_from(3003), Ok(ErrorCode::InvalidStatus));
        assert_eq!(ErrorCode::try_from(5004), Ok(ErrorCode::FileContentMismatch));
        assert_eq!(ErrorCode::try_from(9001), Ok(ErrorCode::InternalError));
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(999), Err(InvalidErrorCode(999)));
        assert_eq!(ErrorCode::try_from(1002), Err(InvalidErrorCode(1002)));
        assert_eq!(ErrorCode::try_from(10000), Err(InvalidErrorCode(10000)));
    }

    #[test]
    fn test_every_code_round_trips_through_u16() {
        let codes = [
            ErrorCode::Success,
            ErrorCode::RequiredField,
            ErrorCode::TokenInvalid,
            ErrorCode::CannotReviewRole,
            ErrorCode::EntryOutsideWeek,
            ErrorCode::PayPeriodOverlap,
            ErrorCode::FileStorageFailed,
            ErrorCode::UserEmailExists,
            ErrorCode::ConfigError,
        ];
        for code in codes {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_serialize() {
        let json = serde_json::to_string(&ErrorCode::NotFound).unwrap();
        assert_eq!(json, "3");

        let json = serde_json::to_string(&ErrorCode::TimesheetExists).unwrap();
        assert_eq!(json, "3002");
    }

    #[test]
    fn test_deserialize_invalid() {
        let result: Result<ErrorCode, _> = serde_json::from_str("999");
        assert!(result.is_err());
    }

    #[test]
    fn test_message() {
        assert_eq!(ErrorCode::NotFound.message(), "Resource not found");
        assert_eq!(
            ErrorCode::PayPeriodHasPending.message(),
            "All timesheets must be approved"
        );
        assert_eq!(ErrorCode::InternalError.message(), "Internal server error");
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", ErrorCode::Success), "0");
        assert_eq!(format!("{}", ErrorCode::PeriodLocked), "3004");
        assert_eq!(format!("{}", InvalidErrorCode(7)), "invalid error code: 7");
    }
}
