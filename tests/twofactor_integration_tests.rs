//! End-to-end 2FA lifecycle tests against the mock Auth Service.

use std::sync::Arc;

use rentiva_twofactor::client::{
    ApiError, AuthApi, MessageResponse, ProfileResponse, Role, SessionToken, SetupResponse,
    TwoFactorStatusResponse,
};
use rentiva_twofactor::mocks::MockAuthApi;
use rentiva_twofactor::storage::{KeyValueStore, MemoryStore, USER_KEY};
use rentiva_twofactor::twofactor::{
    ChallengeMode, EnforcementGate, FlowError, GateContext, GateDecision, LoginChallenge,
    ManageView, ManagementFlow, PolicyStore, SetupFlow, SetupState, StatusStore,
};

fn status(enabled: bool, verified: bool) -> TwoFactorStatusResponse {
    TwoFactorStatusResponse {
        enabled,
        verified,
        has_secret: enabled,
        has_backup_codes: enabled,
    }
}

fn setup_material() -> SetupResponse {
    SetupResponse {
        secret: "JBSWY3DPEHPK3PXP".to_string(),
        qr_code: "data:image/svg+xml;base64,abc".to_string(),
        backup_codes: vec!["AAAA1111".to_string(), "BBBB2222".to_string()],
    }
}

fn admin_profile(enabled: bool, verified: bool) -> ProfileResponse {
    ProfileResponse {
        two_factor_enabled: enabled,
        two_factor_verified: verified,
        role: Role::Admin,
    }
}

fn admin_ctx() -> GateContext {
    GateContext {
        auth_loading: false,
        settings_loading: false,
        authenticated: true,
        role: Role::Admin,
        attempted_path: "/admin/listings".to_string(),
    }
}

/// An admin under a 2FA requirement is locked into setup, completes it,
/// and the lock releases without any dismissal.
#[tokio::test]
async fn test_forced_setup_lifecycle() {
    let api = Arc::new(MockAuthApi::new());
    let store = Arc::new(StatusStore::new(Arc::clone(&api) as Arc<dyn AuthApi>));
    let policy = Arc::new(PolicyStore::load(Arc::new(MemoryStore::new())));
    policy.set_required(true);

    api.push_status(Ok(status(false, false)));
    store.fetch().await;

    let mut gate = EnforcementGate::new(
        Arc::clone(&api) as Arc<dyn AuthApi>,
        Arc::clone(&store),
        Arc::clone(&policy),
    );
    api.push_profile(Ok(admin_profile(false, false)));
    gate.mount().await;
    assert_eq!(
        gate.evaluate(&admin_ctx()),
        GateDecision::Render {
            force_setup: true
        }
    );

    // the forced overlay hosts the setup flow
    api.push_setup(Ok(setup_material()));
    let mut setup = SetupFlow::begin(Arc::clone(&api) as Arc<dyn AuthApi>, Arc::clone(&store))
        .await
        .unwrap();
    assert_eq!(setup.material().unwrap().backup_codes.len(), 2);

    setup.continue_to_verification().unwrap();
    api.push_verify_setup(Ok(()));
    api.push_status(Ok(status(true, true)));
    assert!(setup.input_code("123456").await);
    assert_eq!(setup.state(), SetupState::Complete);

    // the overlay closes on its own once the account is protected
    assert_eq!(
        gate.evaluate(&admin_ctx()),
        GateDecision::Render {
            force_setup: false
        }
    );
}

/// One login challenge, satisfied by a backup code after TOTP fails, is
/// resolved exactly once.
#[tokio::test]
async fn test_login_challenge_is_an_exclusive_or() {
    let api = Arc::new(MockAuthApi::new());
    let storage = MemoryStore::new();
    storage.set(USER_KEY, r#"{"id":"u-9","email":"host@rentiva.test"}"#);

    let mut challenge =
        LoginChallenge::begin(Arc::clone(&api) as Arc<dyn AuthApi>, &storage).unwrap();
    assert_eq!(challenge.mode(), ChallengeMode::Totp);

    api.push_verify_totp(Err(ApiError::Status {
        status: 400,
        message: "invalid code".into(),
    }));
    assert!(challenge.input("000000").await);
    assert_eq!(challenge.error(), Some(&FlowError::InvalidCode));

    // "try backup code instead" clears the inline error
    challenge.switch_mode();
    assert!(challenge.error().is_none());

    api.push_verify_backup(Ok(SessionToken("sess-backup".into())));
    assert!(challenge.input("AAAA1111").await);
    assert_eq!(challenge.token(), Some(&SessionToken("sess-backup".into())));

    // both sub-forms are now inert
    assert!(!challenge.input("BBBB2222").await);
    challenge.switch_mode();
    assert!(!challenge.input("123456").await);
    assert_eq!(api.verify_totp_calls(), 1);
    assert_eq!(api.verify_backup_calls(), 1);
}

/// The challenge never touches the network without a persisted user.
#[tokio::test]
async fn test_challenge_requires_stored_user_context() {
    let api = Arc::new(MockAuthApi::new());
    let storage = MemoryStore::new();

    let err = LoginChallenge::begin(Arc::clone(&api) as Arc<dyn AuthApi>, &storage)
        .err()
        .unwrap();
    assert_eq!(err.to_string(), "Missing user context. Please login again.");
    assert_eq!(api.verify_totp_calls(), 0);
    assert_eq!(api.verify_backup_calls(), 0);
}

/// Disabling walks the password gate, resets local state, and re-arms
/// enforcement.
#[tokio::test]
async fn test_disable_resets_state_and_rearms_enforcement() {
    let api = Arc::new(MockAuthApi::new());
    let store = Arc::new(StatusStore::new(Arc::clone(&api) as Arc<dyn AuthApi>));
    let policy = Arc::new(PolicyStore::load(Arc::new(MemoryStore::new())));
    policy.set_required(true);

    api.push_status(Ok(status(true, true)));
    store.fetch().await;
    assert!(store.current().is_protected());

    let mut gate = EnforcementGate::new(
        Arc::clone(&api) as Arc<dyn AuthApi>,
        Arc::clone(&store),
        Arc::clone(&policy),
    );
    api.push_profile(Ok(admin_profile(true, true)));
    gate.mount().await;
    assert_eq!(
        gate.evaluate(&admin_ctx()),
        GateDecision::Render {
            force_setup: false
        }
    );

    let mut manage =
        ManagementFlow::new(Arc::clone(&api) as Arc<dyn AuthApi>, Arc::clone(&store));
    manage.open_disable();

    // wrong password first: state must not move
    api.push_disable(Err(ApiError::Status {
        status: 400,
        message: "wrong".into(),
    }));
    assert_eq!(
        manage.confirm_disable("oops").await.unwrap_err(),
        FlowError::InvalidPassword
    );
    assert!(store.current().is_protected());

    api.push_disable(Ok(MessageResponse {
        message: "2FA disabled".into(),
    }));
    api.push_status(Ok(status(false, false)));
    manage.confirm_disable("hunter2").await.unwrap();

    assert!(!store.current().enabled);
    assert_eq!(
        gate.evaluate(&admin_ctx()),
        GateDecision::Render {
            force_setup: true
        }
    );
}

/// Two regenerations in one session display the second set only.
#[tokio::test]
async fn test_regenerated_codes_replace_the_previous_set() {
    let api = Arc::new(MockAuthApi::new());
    let store = Arc::new(StatusStore::new(Arc::clone(&api) as Arc<dyn AuthApi>));
    let mut manage = ManagementFlow::new(Arc::clone(&api) as Arc<dyn AuthApi>, store);

    api.push_backup_codes(Ok(vec!["AAAA1111".into(), "BBBB2222".into()]));
    manage.open_regenerate();
    manage.confirm_regenerate("hunter2").await.unwrap();
    assert_eq!(manage.view(), ManageView::BackupCodes);

    api.push_backup_codes(Ok(vec!["CCCC3333".into(), "DDDD4444".into()]));
    manage.open_regenerate();
    manage.confirm_regenerate("hunter2").await.unwrap();

    assert_eq!(
        manage.codes(),
        ["CCCC3333".to_string(), "DDDD4444".to_string()]
    );
    let exported = manage.export_file().unwrap();
    assert!(exported.contains("CCCC3333"));
    assert!(
        !exported.contains("AAAA1111"),
        "the first set is gone from every affordance"
    );
}
