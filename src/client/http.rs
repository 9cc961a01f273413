//! reqwest-backed implementation of the Auth Service contract.

use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::json;

use crate::types::ClientConfig;

use super::dto::{
    BackupCodesResponse, MessageResponse, ProfileResponse, SessionToken, SetupResponse,
    TokenResponse, TwoFactorStatusResponse,
};
use super::{ApiError, AuthApi, ErrorResponse};

/// HTTP client for the Auth Service.
///
/// Requests are fire-and-await with no client-side timeout; a hung request
/// is resolved by the transport layer, not by us.
pub struct HttpAuthApi {
    http: Client,
    base_url: String,
    session_token: Mutex<Option<String>>,
}

impl HttpAuthApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: Client::new(),
            base_url,
            session_token: Mutex::new(None),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.auth_service_url.clone())
    }

    /// Sets or clears the bearer token used by authenticated endpoints.
    pub fn set_session_token(&self, token: Option<SessionToken>) {
        *self.session_token.lock().unwrap() = token.map(|t| t.0);
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        let token = self.session_token.lock().unwrap().clone();
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn check(resp: Response) -> Result<Response, ApiError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        // Prefer the service's own message; the body is not guaranteed.
        let message = match resp.json::<ErrorResponse>().await {
            Ok(body) => body.message,
            Err(_) => status.canonical_reason().unwrap_or("request failed").to_string(),
        };
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn fetch_status(&self) -> Result<TwoFactorStatusResponse, ApiError> {
        log::debug!("fetching 2FA status");
        let resp = self.authed(self.http.get(self.url("/auth/2fa/status"))).send().await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    async fn begin_setup(&self) -> Result<SetupResponse, ApiError> {
        log::debug!("requesting 2FA setup material");
        let resp = self.authed(self.http.post(self.url("/auth/2fa/setup"))).send().await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    async fn verify_setup(&self, code: &str) -> Result<(), ApiError> {
        let resp = self
            .authed(self.http.post(self.url("/auth/2fa/verify")))
            .json(&json!({ "code": code }))
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn verify_totp(&self, user_id: &str, code: &str) -> Result<SessionToken, ApiError> {
        let resp = self
            .http
            .post(self.url("/auth/2fa/verify-token"))
            .json(&json!({ "userId": user_id, "code": code }))
            .send()
            .await?;
        let body: TokenResponse = Self::check(resp).await?.json().await?;
        Ok(SessionToken(body.token))
    }

    async fn verify_backup(&self, user_id: &str, code: &str) -> Result<SessionToken, ApiError> {
        let resp = self
            .http
            .post(self.url("/auth/2fa/verify-backup"))
            .json(&json!({ "userId": user_id, "code": code }))
            .send()
            .await?;
        let body: TokenResponse = Self::check(resp).await?.json().await?;
        Ok(SessionToken(body.token))
    }

    async fn disable(&self, current_password: &str) -> Result<MessageResponse, ApiError> {
        log::debug!("disabling 2FA");
        let resp = self
            .authed(self.http.post(self.url("/auth/2fa/disable")))
            .json(&json!({ "password": current_password }))
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    async fn regenerate_backup_codes(
        &self,
        current_password: &str,
    ) -> Result<Vec<String>, ApiError> {
        log::debug!("regenerating backup codes");
        let resp = self
            .authed(self.http.post(self.url("/auth/2fa/backup-codes")))
            .json(&json!({ "password": current_password }))
            .send()
            .await?;
        let body: BackupCodesResponse = Self::check(resp).await?.json().await?;
        Ok(body.backup_codes)
    }

    async fn fetch_profile(&self) -> Result<ProfileResponse, ApiError> {
        let resp = self.authed(self.http.get(self.url("/auth/profile"))).send().await?;
        Ok(Self::check(resp).await?.json().await?)
    }
}
