//! Format schemas for codes and passwords.
//!
//! Validation failures are caught here, before any network call.

use once_cell::sync::Lazy;
use regex::Regex;

use super::error::FlowError;

/// TOTP codes are exactly six digits.
pub const TOTP_CODE_LENGTH: usize = 6;

/// Backup codes are exactly eight uppercase alphanumeric characters.
pub const BACKUP_CODE_LENGTH: usize = 8;

static TOTP_CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{6}$").unwrap());
static BACKUP_CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z0-9]{8}$").unwrap());

/// Validates a TOTP code against the six-digit schema.
pub fn validate_totp_code(code: &str) -> Result<(), FlowError> {
    if TOTP_CODE_RE.is_match(code) {
        Ok(())
    } else {
        Err(FlowError::Validation("Verification code must be 6 digits".to_string()))
    }
}

/// Validates a backup code against the eight-character schema.
pub fn validate_backup_code(code: &str) -> Result<(), FlowError> {
    if BACKUP_CODE_RE.is_match(code) {
        Ok(())
    } else {
        Err(FlowError::Validation(format!(
            "Backup code must be {BACKUP_CODE_LENGTH} characters"
        )))
    }
}

/// The account is already authenticated, so the confirmation password only
/// has to be present. Strength rules were applied when it was set.
pub fn validate_current_password(password: &str) -> Result<(), FlowError> {
    if password.is_empty() {
        Err(FlowError::Validation("Current password is required".to_string()))
    } else {
        Ok(())
    }
}

/// Whether a TOTP input has reached the auto-submit trigger.
pub fn totp_ready(input: &str) -> bool {
    TOTP_CODE_RE.is_match(input)
}

/// Whether a backup-code input has reached the auto-submit trigger.
///
/// Fires only at the full schema length, so a partially typed code is
/// never submitted.
pub fn backup_ready(input: &str) -> bool {
    BACKUP_CODE_RE.is_match(input)
}

/// Trims and upper-cases a backup-code input so a lowercase paste still
/// satisfies the schema.
pub fn normalize_backup_input(input: &str) -> String {
    input.trim().to_uppercase()
}
