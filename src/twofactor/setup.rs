//! Setup flow: provisioning material display, then TOTP verification.
//!
//! The flow walks `Material → Verify → Complete`, with `Cancelled` reachable
//! only from `Material`. Advancing past the material screen is always
//! user-initiated; backup codes must be acknowledged, never skipped by a
//! timer.

use std::sync::Arc;

use crate::client::{AuthApi, SetupResponse};

use super::error::FlowError;
use super::status::StatusStore;
use super::submission::SubmissionGuard;
use super::validation;

/// Secret, QR image, and backup codes for one setup session.
///
/// Held in memory for the duration of the session only; discarded on
/// completion or cancellation.
#[derive(Debug, Clone)]
pub struct SetupMaterial {
    pub secret: String,
    pub qr_code: String,
    pub backup_codes: Vec<String>,
}

impl From<SetupResponse> for SetupMaterial {
    fn from(dto: SetupResponse) -> Self {
        Self {
            secret: dto.secret,
            qr_code: dto.qr_code,
            backup_codes: dto.backup_codes,
        }
    }
}

/// Where the setup flow currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupState {
    /// Showing QR, secret, and backup codes.
    Material,
    /// Awaiting the first TOTP code.
    Verify,
    /// Verification succeeded; 2FA is enabled.
    Complete,
    /// Aborted before anything was enabled server-side.
    Cancelled,
}

/// State machine for enabling 2FA on an account.
pub struct SetupFlow {
    api: Arc<dyn AuthApi>,
    store: Arc<StatusStore>,
    state: SetupState,
    material: Option<SetupMaterial>,
    code_input: String,
    error: Option<FlowError>,
    guard: SubmissionGuard,
}

impl SetupFlow {
    /// Starts a setup session by requesting provisioning material.
    ///
    /// The material request is one-shot for the session; `back()` never
    /// refetches it.
    pub async fn begin(api: Arc<dyn AuthApi>, store: Arc<StatusStore>) -> Result<Self, FlowError> {
        let material = match api.begin_setup().await {
            Ok(dto) => SetupMaterial::from(dto),
            Err(err) => {
                log::error!("2FA setup request failed: {err}");
                return Err(FlowError::Transport);
            },
        };

        Ok(Self {
            api,
            store,
            state: SetupState::Material,
            material: Some(material),
            code_input: String::new(),
            error: None,
            guard: SubmissionGuard::new(),
        })
    }

    pub fn state(&self) -> SetupState {
        self.state
    }

    pub fn material(&self) -> Option<&SetupMaterial> {
        self.material.as_ref()
    }

    pub fn error(&self) -> Option<&FlowError> {
        self.error.as_ref()
    }

    pub fn code_input(&self) -> &str {
        &self.code_input
    }

    /// Advances to the verification step. User-initiated only.
    pub fn continue_to_verification(&mut self) -> Result<(), FlowError> {
        if self.state != SetupState::Material {
            return Err(FlowError::Validation("Setup is not showing codes".to_string()));
        }
        self.state = SetupState::Verify;
        self.error = None;
        Ok(())
    }

    /// Returns to the material screen. The original codes remain valid for
    /// this session.
    pub fn back(&mut self) -> Result<(), FlowError> {
        if self.state != SetupState::Verify {
            return Err(FlowError::Validation("Nothing to go back to".to_string()));
        }
        self.state = SetupState::Material;
        self.code_input.clear();
        self.error = None;
        Ok(())
    }

    /// Aborts the session. Allowed only while showing material; nothing has
    /// been enabled server-side at that point.
    pub fn cancel(&mut self) -> Result<(), FlowError> {
        if self.state != SetupState::Material {
            return Err(FlowError::Validation("Setup can only be cancelled before verification".to_string()));
        }
        self.state = SetupState::Cancelled;
        self.material = None;
        Ok(())
    }

    /// Replaces the code field's contents, auto-submitting when the sixth
    /// digit lands. Returns whether a submission fired.
    ///
    /// Exactly one request per attempt: re-entering the same six digits
    /// while a request is in flight, or after the flow completed, fires
    /// nothing.
    pub async fn input_code(&mut self, input: &str) -> bool {
        if self.state != SetupState::Verify {
            return false;
        }

        self.code_input = input.trim().to_string();
        if !validation::totp_ready(&self.code_input) {
            return false;
        }

        let Some(id) = self.guard.try_begin() else {
            return false;
        };

        let code = self.code_input.clone();
        let result = self.api.verify_setup(&code).await;
        match result {
            Ok(()) => {
                self.guard.finish(id, true);
                self.error = None;
                self.state = SetupState::Complete;
                self.material = None;
                // Authoritative refresh; the account is now enabled+verified.
                self.store.fetch().await;
            },
            Err(err) => {
                self.guard.finish(id, false);
                self.error = Some(FlowError::from_code_verification(&err));
            },
        }
        true
    }
}
