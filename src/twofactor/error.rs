//! Flow-level error types for the 2FA lifecycle.
//!
//! Every flow surfaces failures through [`FlowError`] so the host UI can
//! render one message per error without inspecting transport details.

use thiserror::Error;

use crate::client::ApiError;

/// Errors surfaced by the 2FA flows.
///
/// Variants map one-to-one onto the remediations a user can take:
/// fix the input, re-type the credential, re-login, or retry later.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    /// Malformed input caught before any network call.
    #[error("{0}")]
    Validation(String),

    /// The pre-2FA login step left no user record behind.
    #[error("Missing user context. Please login again.")]
    MissingUserContext,

    /// The server rejected a TOTP or backup code.
    #[error("Invalid verification code")]
    InvalidCode,

    /// The server rejected the current-password confirmation.
    #[error("Invalid current password")]
    InvalidPassword,

    /// The session is gone; re-typing the credential will not help.
    #[error("You must be logged in to perform this action")]
    NotLoggedIn,

    /// Transport or unknown failure. Details are logged, not shown.
    #[error("Something went wrong. Please try again.")]
    Transport,
}

impl FlowError {
    /// Maps an API failure from a password-confirmed mutation
    /// (disable, regenerate backup codes).
    ///
    /// 400 means the password was wrong, 401 means the session is gone,
    /// anything else is a generic retry.
    pub(crate) fn from_password_action(err: &ApiError) -> Self {
        match err.status() {
            Some(400) => FlowError::InvalidPassword,
            Some(401) => FlowError::NotLoggedIn,
            _ => {
                log::error!("password-confirmed action failed: {err}");
                FlowError::Transport
            },
        }
    }

    /// Maps an API failure from a code verification call.
    pub(crate) fn from_code_verification(err: &ApiError) -> Self {
        match err.status() {
            Some(400) => FlowError::InvalidCode,
            Some(401) => FlowError::NotLoggedIn,
            _ => {
                log::error!("code verification failed: {err}");
                FlowError::Transport
            },
        }
    }

    /// True when the user may fix the failure by retrying from the same
    /// state (wrong code, wrong password, transient transport error).
    pub fn is_retryable(&self) -> bool {
        !matches!(self, FlowError::MissingUserContext | FlowError::NotLoggedIn)
    }
}
