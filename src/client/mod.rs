//! Auth Service RPC contract.
//!
//! The 2FA flows talk to the backend exclusively through [`AuthApi`]; the
//! production implementation is [`http::HttpAuthApi`] and tests substitute
//! `crate::mocks::MockAuthApi`.

pub mod dto;
pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use dto::{
    BackupCodesResponse, MessageResponse, ProfileResponse, Role, SessionToken, SetupResponse,
    TokenResponse, TwoFactorStatusResponse,
};
pub use http::HttpAuthApi;

/// Standard error body returned by the Auth Service.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Wire-level failures from the Auth Service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The service answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The request never completed (DNS, connect, reset).
    #[error("transport error: {0}")]
    Transport(String),

    /// The service answered, but the body was not the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// HTTP status of the failure, when the service answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

/// The seven 2FA operations plus the canonical profile fetch.
///
/// Endpoints that carry the session token require it to have been set on
/// the implementation; `verify_totp`/`verify_backup` run pre-session and
/// send none.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// `GET status`. Idempotent.
    async fn fetch_status(&self) -> Result<TwoFactorStatusResponse, ApiError>;

    /// `POST setup`. One-shot per setup session.
    async fn begin_setup(&self) -> Result<SetupResponse, ApiError>;

    /// `POST verify`. Transitions the account from disabled to enabled.
    async fn verify_setup(&self, code: &str) -> Result<(), ApiError>;

    /// `POST verify-token`. Login-time TOTP challenge, pre-session.
    async fn verify_totp(&self, user_id: &str, code: &str) -> Result<SessionToken, ApiError>;

    /// `POST verify-backup`. Login-time backup challenge, consumes the code.
    async fn verify_backup(&self, user_id: &str, code: &str) -> Result<SessionToken, ApiError>;

    /// `POST disable`. Password-confirmed; resets all status fields.
    async fn disable(&self, current_password: &str) -> Result<MessageResponse, ApiError>;

    /// `POST backup-codes`. Password-confirmed; full replace, not append.
    async fn regenerate_backup_codes(
        &self,
        current_password: &str,
    ) -> Result<Vec<String>, ApiError>;

    /// `GET profile`. Canonical account flags for the enforcement gate.
    async fn fetch_profile(&self) -> Result<ProfileResponse, ApiError>;
}
