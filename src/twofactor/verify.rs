//! Login-time 2FA challenge.
//!
//! After primary authentication the user proves possession with either a
//! TOTP code or a backup code. The two are equivalent proofs; exactly one
//! is required, and one challenge resolves one login attempt to a session
//! token. The backend consumes a used backup code, so the client never
//! assumes a code stays valid.

use std::sync::Arc;

use uuid::Uuid;

use crate::client::{AuthApi, SessionToken};
use crate::storage::{self, KeyValueStore};

use super::error::FlowError;
use super::submission::SubmissionGuard;
use super::validation;

/// Which proof the user is currently typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeMode {
    Totp,
    Backup,
}

impl ChallengeMode {
    fn other(self) -> Self {
        match self {
            ChallengeMode::Totp => ChallengeMode::Backup,
            ChallengeMode::Backup => ChallengeMode::Totp,
        }
    }
}

/// One outstanding challenge for one login attempt.
pub struct LoginChallenge {
    api: Arc<dyn AuthApi>,
    challenge_id: Uuid,
    user_id: String,
    mode: ChallengeMode,
    totp_input: String,
    backup_input: String,
    error: Option<FlowError>,
    guard: SubmissionGuard,
    token: Option<SessionToken>,
}

impl LoginChallenge {
    /// Starts a challenge for the user the pre-2FA login step persisted.
    ///
    /// A missing user record is a fatal precondition: no network call is
    /// issued and the caller must send the user back to login.
    pub fn begin(
        api: Arc<dyn AuthApi>,
        store: &dyn KeyValueStore,
    ) -> Result<Self, FlowError> {
        let user_id = storage::stored_user_id(store).ok_or(FlowError::MissingUserContext)?;
        log::debug!("starting 2FA challenge for user {user_id}");

        Ok(Self {
            api,
            challenge_id: Uuid::new_v4(),
            user_id,
            mode: ChallengeMode::Totp,
            totp_input: String::new(),
            backup_input: String::new(),
            error: None,
            guard: SubmissionGuard::new(),
            token: None,
        })
    }

    pub fn challenge_id(&self) -> Uuid {
        self.challenge_id
    }

    pub fn mode(&self) -> ChallengeMode {
        self.mode
    }

    pub fn error(&self) -> Option<&FlowError> {
        self.error.as_ref()
    }

    /// The session token, once either proof has succeeded.
    pub fn token(&self) -> Option<&SessionToken> {
        self.token.as_ref()
    }

    pub fn has_verified(&self) -> bool {
        self.token.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.guard.is_in_flight()
    }

    /// Switches between authenticator-app and backup-code entry, clearing
    /// both fields and any inline error.
    pub fn switch_mode(&mut self) {
        self.mode = self.mode.other();
        self.totp_input.clear();
        self.backup_input.clear();
        self.error = None;
    }

    /// Replaces the active field's contents, auto-submitting when the input
    /// satisfies the active mode's schema. Returns whether a submission
    /// fired.
    ///
    /// Auto-submit is suppressed while a request is in flight and forever
    /// once the challenge has been resolved.
    pub async fn input(&mut self, text: &str) -> bool {
        let ready = match self.mode {
            ChallengeMode::Totp => {
                self.totp_input = text.trim().to_string();
                validation::totp_ready(&self.totp_input)
            },
            ChallengeMode::Backup => {
                self.backup_input = validation::normalize_backup_input(text);
                validation::backup_ready(&self.backup_input)
            },
        };
        if !ready {
            return false;
        }

        let Some(id) = self.guard.try_begin() else {
            return false;
        };

        let result = match self.mode {
            ChallengeMode::Totp => {
                let code = self.totp_input.clone();
                self.api.verify_totp(&self.user_id, &code).await
            },
            ChallengeMode::Backup => {
                let code = self.backup_input.clone();
                self.api.verify_backup(&self.user_id, &code).await
            },
        };

        match result {
            Ok(token) => {
                self.guard.finish(id, true);
                self.error = None;
                self.token = Some(token);
            },
            Err(err) => {
                self.guard.finish(id, false);
                self.error = Some(FlowError::from_code_verification(&err));
            },
        }
        true
    }
}
