//! Post-enablement management: disable 2FA and regenerate backup codes.
//!
//! Both mutations are destructive or sensitive, so each is gated by a
//! current-password confirmation and fails closed: the status store is
//! only touched after an explicit success response.

use std::path::Path;
use std::sync::Arc;

use crate::client::AuthApi;

use super::error::FlowError;
use super::export;
use super::status::{StatusPatch, StatusStore};
use super::validation;

/// Which surface the management UI is showing.
///
/// Exactly one is visible at a time; the enum makes that mutual
/// exclusivity structural.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManageView {
    Idle,
    /// Password prompt before disabling.
    DisablePrompt,
    /// Password prompt before regenerating backup codes.
    RegeneratePrompt,
    /// One-time display of a freshly generated code set.
    BackupCodes,
}

/// Flow driving the two password-confirmed mutations.
pub struct ManagementFlow {
    api: Arc<dyn AuthApi>,
    store: Arc<StatusStore>,
    view: ManageView,
    codes: Vec<String>,
    error: Option<FlowError>,
    loading: bool,
}

impl ManagementFlow {
    pub fn new(api: Arc<dyn AuthApi>, store: Arc<StatusStore>) -> Self {
        Self {
            api,
            store,
            view: ManageView::Idle,
            codes: Vec::new(),
            error: None,
            loading: false,
        }
    }

    pub fn view(&self) -> ManageView {
        self.view
    }

    pub fn error(&self) -> Option<&FlowError> {
        self.error.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// The currently displayed code set. Empty outside `BackupCodes`.
    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    pub fn open_disable(&mut self) {
        self.view = ManageView::DisablePrompt;
        self.error = None;
        self.codes.clear();
    }

    pub fn open_regenerate(&mut self) {
        self.view = ManageView::RegeneratePrompt;
        self.error = None;
        self.codes.clear();
    }

    /// Dismisses whatever is open. The one-time code display does not come
    /// back after this.
    pub fn close(&mut self) {
        self.view = ManageView::Idle;
        self.error = None;
        self.codes.clear();
    }

    /// Disables 2FA after confirming the current password.
    ///
    /// On success the status store is reset to the disabled defaults and
    /// then refreshed from the server.
    pub async fn confirm_disable(&mut self, current_password: &str) -> Result<(), FlowError> {
        if self.view != ManageView::DisablePrompt {
            return Err(FlowError::Validation("Disable is not open".to_string()));
        }
        self.submit_password(current_password, PasswordAction::Disable).await
    }

    /// Replaces the entire backup-code set after confirming the current
    /// password. The previous set is invalid the moment this succeeds.
    pub async fn confirm_regenerate(&mut self, current_password: &str) -> Result<(), FlowError> {
        if self.view != ManageView::RegeneratePrompt {
            return Err(FlowError::Validation("Regenerate is not open".to_string()));
        }
        self.submit_password(current_password, PasswordAction::Regenerate).await
    }

    async fn submit_password(
        &mut self,
        current_password: &str,
        action: PasswordAction,
    ) -> Result<(), FlowError> {
        if self.loading {
            return Err(FlowError::Validation("A request is already in progress".to_string()));
        }
        if let Err(err) = validation::validate_current_password(current_password) {
            self.error = Some(err.clone());
            return Err(err);
        }

        self.loading = true;
        let result = match action {
            PasswordAction::Disable => {
                self.api.disable(current_password).await.map(|ack| {
                    log::info!("2FA disabled: {}", ack.message);
                    Vec::new()
                })
            },
            PasswordAction::Regenerate => self.api.regenerate_backup_codes(current_password).await,
        };
        self.loading = false;

        match result {
            Ok(codes) => {
                self.error = None;
                match action {
                    PasswordAction::Disable => {
                        self.store.reset();
                        self.store.fetch().await;
                        self.view = ManageView::Idle;
                    },
                    PasswordAction::Regenerate => {
                        // Full replace, never a union with the previous set.
                        self.codes = codes;
                        self.store.update(StatusPatch {
                            has_backup_codes: Some(true),
                            ..StatusPatch::default()
                        });
                        self.view = ManageView::BackupCodes;
                    },
                }
                Ok(())
            },
            Err(err) => {
                let mapped = FlowError::from_password_action(&err);
                self.error = Some(mapped.clone());
                Err(mapped)
            },
        }
    }

    /// Text-file rendering of the displayed code set.
    pub fn export_file(&self) -> Option<String> {
        if self.view != ManageView::BackupCodes {
            return None;
        }
        Some(export::backup_codes_file(&self.codes))
    }

    /// Writes the displayed code set to disk.
    pub fn download_to(&self, path: &Path) -> Result<(), FlowError> {
        if self.view != ManageView::BackupCodes {
            return Err(FlowError::Validation("No codes to download".to_string()));
        }
        export::write_backup_codes(path, &self.codes).map_err(|err| {
            log::error!("backup code download failed: {err}");
            FlowError::Transport
        })
    }

    /// A single code for the host UI's copy button.
    pub fn copy_code(&self, index: usize) -> Option<&str> {
        export::code_for_clipboard(&self.codes, index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PasswordAction {
    Disable,
    Regenerate,
}
