//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! SQLite TEXT has no built-in length enforcement, so every limit is
//! checked here before a write.

use validator::ValidateEmail;

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Family names (product rule: 2..=50)
pub const MIN_FAMILY_NAME_LEN: usize = 2;
pub const MAX_FAMILY_NAME_LEN: usize = 50;

/// Wishlist item titles
pub const MAX_TITLE_LEN: usize = 200;

/// Gift group names
pub const MAX_GROUP_NAME_LEN: usize = 100;

/// Notes, descriptions, chat messages, allergies, etc.
pub const MAX_NOTE_LEN: usize = 500;

/// Short free-text fields: sizes, occasion, category, vehicle make/model
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Passwords (before hashing)
pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 128;

/// URLs / image links
pub const MAX_URL_LEN: usize = 2048;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
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
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

/// Validate email syntax and length.
pub fn validate_email(value: &str) -> Result<(), AppError> {
    if value.len() > MAX_EMAIL_LEN || !value.validate_email() {
        return Err(AppError::validation("Invalid email address".to_string()));
    }
    Ok(())
}

/// Validate that an optional URL, if present, is http(s) and within limits.
pub fn validate_optional_url(value: &Option<String>, field: &str) -> Result<(), AppError> {
    if let Some(v) = value {
        if v.len() > MAX_URL_LEN {
            return Err(AppError::validation(format!(
                "{field} is too long ({} chars, max {MAX_URL_LEN})",
                v.len()
            )));
        }
        let well_formed = (v.starts_with("http://") || v.starts_with("https://"))
            && !v.contains(char::is_whitespace);
        if !well_formed {
            return Err(AppError::validation(format!("{field} is not a valid URL")));
        }
    }
    Ok(())
}
