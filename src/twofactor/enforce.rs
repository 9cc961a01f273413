//! Route guard forcing 2FA setup on privileged sessions.
//!
//! Evaluated on every render of a privileged route. Nothing renders until
//! auth, settings, status, and the canonical profile fetch have all
//! settled; then the guard either redirects, renders normally, or renders
//! with a forced, non-dismissable setup overlay.

use std::sync::Arc;

use crate::client::{AuthApi, ProfileResponse, Role};

use super::policy::PolicyStore;
use super::status::StatusStore;

/// Where a status view came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// The local store, used while canonical data is loading or stale.
    Cached,
    /// The profile fetched from the server for this mount.
    Canonical,
}

/// The single status view the guard evaluates, with its provenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusView {
    pub freshness: Freshness,
    pub enabled: bool,
    pub verified: bool,
}

impl StatusView {
    pub fn is_protected(&self) -> bool {
        self.enabled && self.verified
    }
}

/// Render-time inputs owned by the host application.
#[derive(Debug, Clone)]
pub struct GateContext {
    pub auth_loading: bool,
    pub settings_loading: bool,
    pub authenticated: bool,
    /// Role from the session's auth state; the canonical profile's role
    /// wins over this when available.
    pub role: Role,
    /// Path the user was trying to reach, preserved across the login
    /// redirect.
    pub attempted_path: String,
}

/// What the privileged route should do right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Some input is still settling; render nothing yet.
    Loading,
    /// Not authenticated; go to login and come back to the attempted path.
    RedirectToLogin { attempted_path: String },
    /// Authenticated but not an admin; go to the non-privileged home.
    RedirectHome,
    /// Render the route. While `force_setup` is true the host must show
    /// the setup overlay with no close affordance; it goes away on its own
    /// when a later evaluation returns `force_setup: false`.
    Render { force_setup: bool },
}

/// Guard instance for one mount of a privileged route.
pub struct EnforcementGate {
    api: Arc<dyn AuthApi>,
    store: Arc<StatusStore>,
    policy: Arc<PolicyStore>,
    profile: Option<ProfileResponse>,
    profile_resolved: bool,
    /// Store version at the moment the profile snapshot landed.
    profile_version: u64,
}

impl EnforcementGate {
    pub fn new(api: Arc<dyn AuthApi>, store: Arc<StatusStore>, policy: Arc<PolicyStore>) -> Self {
        Self {
            api,
            store,
            policy,
            profile: None,
            profile_resolved: false,
            profile_version: 0,
        }
    }

    /// Fetches the canonical profile, once per mount. A failed fetch falls
    /// back to the cached store rather than blocking the route forever.
    pub async fn mount(&mut self) {
        if self.profile_resolved {
            return;
        }
        match self.api.fetch_profile().await {
            Ok(profile) => {
                self.profile = Some(profile);
                self.profile_version = self.store.version();
            },
            Err(err) => {
                log::warn!("canonical profile fetch failed, using cached status: {err}");
            },
        }
        self.profile_resolved = true;
    }

    /// The one status the guard trusts, tagged with its provenance.
    ///
    /// The canonical profile wins during the pre-fetch window; once the
    /// store has recorded a newer write (e.g. setup just completed), the
    /// store is the fresher truth.
    pub fn status_view(&self) -> StatusView {
        match self.profile {
            Some(profile) if self.store.version() <= self.profile_version => StatusView {
                freshness: Freshness::Canonical,
                enabled: profile.two_factor_enabled,
                verified: profile.two_factor_verified,
            },
            _ => {
                let status = self.store.current();
                StatusView {
                    freshness: Freshness::Cached,
                    enabled: status.enabled,
                    verified: status.verified,
                }
            },
        }
    }

    /// Computes the guard's decision for the current render.
    pub fn evaluate(&self, ctx: &GateContext) -> GateDecision {
        if ctx.auth_loading
            || ctx.settings_loading
            || self.store.is_loading()
            || !self.profile_resolved
        {
            return GateDecision::Loading;
        }

        if !ctx.authenticated {
            return GateDecision::RedirectToLogin {
                attempted_path: ctx.attempted_path.clone(),
            };
        }

        let role = self.profile.map(|p| p.role).unwrap_or(ctx.role);
        if role != Role::Admin {
            return GateDecision::RedirectHome;
        }

        let must_enforce = self.policy.is_required() && !self.status_view().is_protected();
        GateDecision::Render {
            force_setup: must_enforce,
        }
    }
}
