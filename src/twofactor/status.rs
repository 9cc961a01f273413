//! Canonical 2FA state for the current account.
//!
//! The store is the only state shared between flows. Writes are either
//! authoritative overwrites (a fresh fetch) or partial merges from a flow
//! that already knows the outcome of its mutation; both are idempotent, so
//! concurrent readers and writers need no ordering beyond last-write-wins.

use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::client::{ApiError, AuthApi, TwoFactorStatusResponse};

/// Per-account 2FA state.
///
/// Holds the invariant `verified ⇒ enabled ⇒ has_secret`; every write path
/// goes through [`TwoFactorStatus::normalized`], so no reachable value can
/// violate it. `has_backup_codes` is independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TwoFactorStatus {
    pub enabled: bool,
    pub verified: bool,
    pub has_secret: bool,
    pub has_backup_codes: bool,
}

impl TwoFactorStatus {
    /// The all-false default: 2FA off, nothing provisioned.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            verified: false,
            has_secret: false,
            has_backup_codes: false,
        }
    }

    /// Clamps the flags so `verified ⇒ enabled ⇒ has_secret` holds even if
    /// the server sends an inconsistent combination.
    pub fn normalized(self) -> Self {
        let enabled = self.enabled && self.has_secret;
        Self {
            enabled,
            verified: self.verified && enabled,
            ..self
        }
    }

    /// Whether enforcement considers this account fully protected.
    pub fn is_protected(&self) -> bool {
        self.enabled && self.verified
    }
}

impl From<TwoFactorStatusResponse> for TwoFactorStatus {
    fn from(dto: TwoFactorStatusResponse) -> Self {
        Self {
            enabled: dto.enabled,
            verified: dto.verified,
            has_secret: dto.has_secret,
            has_backup_codes: dto.has_backup_codes,
        }
        .normalized()
    }
}

/// Partial update applied by a flow that already knows its outcome.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusPatch {
    pub enabled: Option<bool>,
    pub verified: Option<bool>,
    pub has_secret: Option<bool>,
    pub has_backup_codes: Option<bool>,
}

/// Why the last status fetch failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatusError {
    #[error("Your session has expired. Please login again.")]
    SessionExpired,

    #[error("Could not reach the authentication service")]
    Unavailable,
}

impl StatusError {
    fn from_api(err: &ApiError) -> Self {
        if err.is_unauthorized() {
            StatusError::SessionExpired
        } else {
            StatusError::Unavailable
        }
    }
}

type StatusObserver = Box<dyn Fn(TwoFactorStatus) + Send + Sync>;

struct StatusInner {
    status: TwoFactorStatus,
    error: Option<StatusError>,
    loading: bool,
    version: u64,
}

/// Client-side cache of the account's 2FA state.
pub struct StatusStore {
    api: Arc<dyn AuthApi>,
    inner: Mutex<StatusInner>,
    observer: Mutex<Option<StatusObserver>>,
}

impl StatusStore {
    pub fn new(api: Arc<dyn AuthApi>) -> Self {
        Self {
            api,
            inner: Mutex::new(StatusInner {
                status: TwoFactorStatus::disabled(),
                error: None,
                loading: false,
                version: 0,
            }),
            observer: Mutex::new(None),
        }
    }

    /// Registers a callback invoked with the fresh status after every
    /// successful fetch. The enforcement gate and interested parents use
    /// this to react to state changes.
    pub fn set_observer(&self, observer: impl Fn(TwoFactorStatus) + Send + Sync + 'static) {
        *self.observer.lock().unwrap() = Some(Box::new(observer));
    }

    /// Fetches the canonical status from the Auth Service.
    ///
    /// On transport failure the last-known fields are preserved and an
    /// error kind is recorded; the failure never propagates past this
    /// boundary. Returns the store's status after the attempt either way.
    pub async fn fetch(&self) -> TwoFactorStatus {
        self.inner.lock().unwrap().loading = true;

        let result = self.api.fetch_status().await;

        let fresh = {
            let mut inner = self.inner.lock().unwrap();
            inner.loading = false;
            match result {
                Ok(dto) => {
                    inner.status = TwoFactorStatus::from(dto);
                    inner.error = None;
                    inner.version += 1;
                    Some(inner.status)
                },
                Err(err) => {
                    log::warn!("2FA status fetch failed, keeping cached status: {err}");
                    inner.error = Some(StatusError::from_api(&err));
                    None
                },
            }
        };

        // Observer runs outside the lock so it may read the store freely.
        if let Some(status) = fresh {
            if let Some(observer) = &*self.observer.lock().unwrap() {
                observer(status);
            }
        }

        self.current()
    }

    /// Optimistic local merge, used when a mutation's outcome is already
    /// known and the next full refresh has not landed yet.
    pub fn update(&self, patch: StatusPatch) {
        let mut inner = self.inner.lock().unwrap();
        let mut status = inner.status;
        if let Some(enabled) = patch.enabled {
            status.enabled = enabled;
        }
        if let Some(verified) = patch.verified {
            status.verified = verified;
        }
        if let Some(has_secret) = patch.has_secret {
            status.has_secret = has_secret;
        }
        if let Some(has_backup_codes) = patch.has_backup_codes {
            status.has_backup_codes = has_backup_codes;
        }
        inner.status = status.normalized();
        inner.version += 1;
    }

    /// Forces the disabled/unknown defaults. Used on logout or hard disable.
    pub fn reset(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.status = TwoFactorStatus::disabled();
        inner.error = None;
        inner.version += 1;
    }

    pub fn current(&self) -> TwoFactorStatus {
        self.inner.lock().unwrap().status
    }

    pub fn last_error(&self) -> Option<StatusError> {
        self.inner.lock().unwrap().error.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.lock().unwrap().loading
    }

    /// Monotonic write counter. Lets a reader tell whether the store has
    /// learned anything since a snapshot it took earlier.
    pub fn version(&self) -> u64 {
        self.inner.lock().unwrap().version
    }
}
