//! Configurable in-memory [`AuthApi`] implementation.
//!
//! Each endpoint holds a FIFO of prepared responses; when the queue runs
//! dry the last response repeats, and an endpoint that was never
//! configured panics on use. Calls are counted per endpoint so tests can
//! assert exactly how many requests fired.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::client::{
    ApiError, AuthApi, MessageResponse, ProfileResponse, SessionToken, SetupResponse,
    TwoFactorStatusResponse,
};

struct Endpoint<T> {
    state: Mutex<EndpointState<T>>,
}

struct EndpointState<T> {
    queue: VecDeque<Result<T, ApiError>>,
    last: Option<Result<T, ApiError>>,
    calls: usize,
}

impl<T> Default for Endpoint<T> {
    fn default() -> Self {
        Self {
            state: Mutex::new(EndpointState {
                queue: VecDeque::new(),
                last: None,
                calls: 0,
            }),
        }
    }
}

impl<T: Clone> Endpoint<T> {
    fn push(&self, response: Result<T, ApiError>) {
        self.state.lock().unwrap().queue.push_back(response);
    }

    fn next(&self, name: &str) -> Result<T, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        match state.queue.pop_front() {
            Some(response) => {
                state.last = Some(response.clone());
                response
            },
            None => state
                .last
                .clone()
                .unwrap_or_else(|| panic!("MockAuthApi::{name} called but no response was configured")),
        }
    }

    fn calls(&self) -> usize {
        self.state.lock().unwrap().calls
    }
}

/// Mock Auth Service for flow tests.
#[derive(Default)]
pub struct MockAuthApi {
    status: Endpoint<TwoFactorStatusResponse>,
    setup: Endpoint<SetupResponse>,
    verify_setup: Endpoint<()>,
    verify_totp: Endpoint<SessionToken>,
    verify_backup: Endpoint<SessionToken>,
    disable: Endpoint<MessageResponse>,
    backup_codes: Endpoint<Vec<String>>,
    profile: Endpoint<ProfileResponse>,
}

impl MockAuthApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_status(&self, response: Result<TwoFactorStatusResponse, ApiError>) {
        self.status.push(response);
    }

    pub fn push_setup(&self, response: Result<SetupResponse, ApiError>) {
        self.setup.push(response);
    }

    pub fn push_verify_setup(&self, response: Result<(), ApiError>) {
        self.verify_setup.push(response);
    }

    pub fn push_verify_totp(&self, response: Result<SessionToken, ApiError>) {
        self.verify_totp.push(response);
    }

    pub fn push_verify_backup(&self, response: Result<SessionToken, ApiError>) {
        self.verify_backup.push(response);
    }

    pub fn push_disable(&self, response: Result<MessageResponse, ApiError>) {
        self.disable.push(response);
    }

    pub fn push_backup_codes(&self, response: Result<Vec<String>, ApiError>) {
        self.backup_codes.push(response);
    }

    pub fn push_profile(&self, response: Result<ProfileResponse, ApiError>) {
        self.profile.push(response);
    }

    pub fn status_calls(&self) -> usize {
        self.status.calls()
    }

    pub fn setup_calls(&self) -> usize {
        self.setup.calls()
    }

    pub fn verify_setup_calls(&self) -> usize {
        self.verify_setup.calls()
    }

    pub fn verify_totp_calls(&self) -> usize {
        self.verify_totp.calls()
    }

    pub fn verify_backup_calls(&self) -> usize {
        self.verify_backup.calls()
    }

    pub fn disable_calls(&self) -> usize {
        self.disable.calls()
    }

    pub fn backup_codes_calls(&self) -> usize {
        self.backup_codes.calls()
    }

    pub fn profile_calls(&self) -> usize {
        self.profile.calls()
    }
}

#[async_trait]
impl AuthApi for MockAuthApi {
    async fn fetch_status(&self) -> Result<TwoFactorStatusResponse, ApiError> {
        self.status.next("fetch_status")
    }

    async fn begin_setup(&self) -> Result<SetupResponse, ApiError> {
        self.setup.next("begin_setup")
    }

    async fn verify_setup(&self, _code: &str) -> Result<(), ApiError> {
        self.verify_setup.next("verify_setup")
    }

    async fn verify_totp(&self, _user_id: &str, _code: &str) -> Result<SessionToken, ApiError> {
        self.verify_totp.next("verify_totp")
    }

    async fn verify_backup(&self, _user_id: &str, _code: &str) -> Result<SessionToken, ApiError> {
        self.verify_backup.next("verify_backup")
    }

    async fn disable(&self, _current_password: &str) -> Result<MessageResponse, ApiError> {
        self.disable.next("disable")
    }

    async fn regenerate_backup_codes(
        &self,
        _current_password: &str,
    ) -> Result<Vec<String>, ApiError> {
        self.backup_codes.next("regenerate_backup_codes")
    }

    async fn fetch_profile(&self) -> Result<ProfileResponse, ApiError> {
        self.profile.next("fetch_profile")
    }
}
