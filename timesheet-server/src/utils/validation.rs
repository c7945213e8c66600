//! Input validation helpers
//!
//! Centralized length and range limits plus validation functions.
//! SQLite TEXT has no built-in length enforcement.

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Display names
pub const MAX_NAME_LEN: usize = 200;

/// History notes, rejection reasons, admin notes
pub const MAX_NOTE_LEN: usize = 500;

/// Owner's free-text notes on a timesheet
pub const MAX_USER_NOTES_LEN: usize = 255;

/// Per reimbursement item notes
pub const MAX_ITEM_NOTES_LEN: usize = 200;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

// ── Numeric limits ──────────────────────────────────────────────────

pub const MAX_HOURS_PER_ENTRY: f64 = 24.0;

/// Reimbursement item amounts are clamped into [0, MAX]
pub const MAX_REIMBURSEMENT_AMOUNT: f64 = 10_000.0;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")).with_detail("field", field));
    }
    if value.chars().count() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.chars().count()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.chars().count() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.chars().count()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Validate a number is finite (rejects NaN / ±inf)
pub fn validate_finite(value: f64, field: &str) -> Result<(), AppError> {
    if !value.is_finite() {
        return Err(
            AppError::validation(format!("{field} must be a finite number")).with_detail("field", field),
        );
    }
    Ok(())
}

/// Minimal email shape check: `local@domain` with a dot in the domain
pub fn validate_email(value: &str) -> Result<(), AppError> {
    validate_required_text(value, "email", MAX_EMAIL_LEN)?;
    let valid = value
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.') && !domain.starts_with('.'));
    if !valid || value.chars().any(char::is_whitespace) {
        return Err(AppError::validation(format!("Invalid email address: {value}")).with_detail("field", "email"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text() {
        assert!(validate_required_text("ok", "reason", 10).is_ok());
        assert!(validate_required_text("   ", "reason", 10).is_err());
        assert!(validate_required_text("abcdefghijk", "reason", 10).is_err());
    }

    #[test]
    fn test_optional_text_counts_chars() {
        assert!(validate_optional_text(&None, "notes", 3).is_ok());
        assert!(validate_optional_text(&Some("äöü".into()), "notes", 3).is_ok());
        assert!(validate_optional_text(&Some("abcd".into()), "notes", 3).is_err());
    }

    #[test]
    fn test_finite() {
        assert!(validate_finite(8.0, "hours").is_ok());
        assert!(validate_finite(f64::NAN, "hours").is_err());
        assert!(validate_finite(f64::INFINITY, "hours").is_err());
    }

    #[test]
    fn test_email() {
        assert!(validate_email("jo@example.com").is_ok());
        assert!(validate_email("jo@localhost").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("jo @example.com").is_err());
    }
}
