//! Rentiva Two-Factor Authentication client
//!
//! Client-side 2FA lifecycle management for the Rentiva marketplace:
//! status tracking, setup and login-time verification flows, backup-code
//! management, and enforcement gating for privileged routes. Talks to the
//! Auth Service over its JSON API; owns the protocol and state machines,
//! not the rendering or the TOTP cryptography.

pub mod client;
pub mod config;
pub mod mocks;
pub mod storage;
pub mod twofactor;
pub mod types;

// Re-export commonly used types and functions
pub use client::{AuthApi, HttpAuthApi, SessionToken};
pub use twofactor::{
    EnforcementGate, FlowError, LoginChallenge, ManagementFlow, PolicyStore, SetupFlow,
    StatusStore, TwoFactorStatus,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const SERVICE_NAME: &str = "rentiva-twofactor";
