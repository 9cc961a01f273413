//! Two-Factor Authentication lifecycle.
//!
//! Client-side state machines and policy for securing marketplace
//! accounts:
//! - setup (provisioning material, first TOTP verification)
//! - login-time challenge (TOTP or single-use backup code)
//! - management (password-confirmed disable and code regeneration)
//! - enforcement gating for privileged routes

pub mod enforce;
pub mod error;
pub mod export;
pub mod manage;
pub mod policy;
pub mod setup;
pub mod status;
pub mod submission;
pub mod validation;
pub mod verify;

pub use enforce::{EnforcementGate, Freshness, GateContext, GateDecision, StatusView};
pub use error::FlowError;
pub use manage::{ManageView, ManagementFlow};
pub use policy::PolicyStore;
pub use setup::{SetupFlow, SetupMaterial, SetupState};
pub use status::{StatusError, StatusPatch, StatusStore, TwoFactorStatus};
pub use submission::{SubmissionGuard, SubmissionId};
pub use verify::{ChallengeMode, LoginChallenge};
