//! Wire types for the Auth Service 2FA endpoints.
//!
//! Field names follow the service's camelCase JSON exactly.

use serde::{Deserialize, Serialize};

/// `GET /auth/2fa/status` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwoFactorStatusResponse {
    pub enabled: bool,
    pub verified: bool,
    pub has_secret: bool,
    pub has_backup_codes: bool,
}

/// `POST /auth/2fa/setup` response. Shown once, never persisted client-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupResponse {
    pub secret: String,
    /// Renderable QR image as a data URI.
    pub qr_code: String,
    pub backup_codes: Vec<String>,
}

/// Session token returned by the login-time challenge endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionToken(pub String);

/// `POST /auth/2fa/verify-token` and `verify-backup` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// `POST /auth/2fa/disable` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// `POST /auth/2fa/backup-codes` response. A full replacement set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupCodesResponse {
    pub backup_codes: Vec<String>,
}

/// Account role as reported by the canonical profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[serde(other)]
    Customer,
}

/// `GET /auth/profile` response, the canonical account state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub two_factor_enabled: bool,
    pub two_factor_verified: bool,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_field_names() {
        let status: TwoFactorStatusResponse = serde_json::from_str(
            r#"{"enabled":true,"verified":false,"hasSecret":true,"hasBackupCodes":true}"#,
        )
        .unwrap();
        assert!(status.enabled);
        assert!(!status.verified);
        assert!(status.has_secret);
        assert!(status.has_backup_codes);
    }

    #[test]
    fn test_setup_wire_field_names() {
        let setup: SetupResponse = serde_json::from_str(
            r#"{"secret":"JBSWY3DP","qrCode":"data:image/svg+xml;base64,...","backupCodes":["ABCD1234"]}"#,
        )
        .unwrap();
        assert_eq!(setup.backup_codes.len(), 1);
        assert!(setup.qr_code.starts_with("data:"));
    }

    #[test]
    fn test_profile_role_parsing() {
        let profile: ProfileResponse = serde_json::from_str(
            r#"{"twoFactorEnabled":true,"twoFactorVerified":true,"role":"admin"}"#,
        )
        .unwrap();
        assert_eq!(profile.role, Role::Admin);

        // unknown roles are never admin
        let profile: ProfileResponse = serde_json::from_str(
            r#"{"twoFactorEnabled":false,"twoFactorVerified":false,"role":"landlord"}"#,
        )
        .unwrap();
        assert_eq!(profile.role, Role::Customer);
    }
}
