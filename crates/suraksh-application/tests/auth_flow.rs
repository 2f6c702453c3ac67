mod common;

use common::FakeBackend;
use std::sync::Arc;
use suraksh_application::AuthUseCase;
use suraksh_core::SurakshError;
use suraksh_core::backend::Registration;
use suraksh_core::session::SessionManager;
use suraksh_core::store::{InMemoryStore, PersistedStore};

fn setup() -> (Arc<InMemoryStore>, Arc<SessionManager>, Arc<FakeBackend>, AuthUseCase) {
    let store = Arc::new(InMemoryStore::new());
    let session = Arc::new(SessionManager::new(store.clone()));
    let backend = Arc::new(FakeBackend::default());
    let auth = AuthUseCase::new(session.clone(), backend.clone());
    (store, session, backend, auth)
}

#[tokio::test]
async fn login_stores_token_then_profile() {
    let (store, session, _backend, auth) = setup();

    let profile = auth.login("analyst", "correct").await.unwrap();

    assert_eq!(profile.clearance_level, "L2");
    assert_eq!(session.token().as_deref(), Some("token-for-analyst"));
    assert_eq!(session.user(), Some(profile));
    assert_eq!(
        store.get("legacy-token").unwrap().as_deref(),
        Some("token-for-analyst")
    );
}

#[tokio::test]
async fn rejected_credentials_leave_session_empty() {
    let (_store, session, _backend, auth) = setup();
    let err = auth.login("analyst", "wrong").await.unwrap_err();
    assert!(err.is_authorization());
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn profile_failure_rolls_back_token() {
    let (store, session, backend, auth) = setup();
    *backend.fail_me.lock().unwrap() = Some(SurakshError::connectivity("reset"));

    let err = auth.login("analyst", "correct").await.unwrap_err();

    assert!(err.is_connectivity());
    assert_eq!(session.token(), None);
    assert_eq!(store.get("legacy-token").unwrap(), None);
}

#[tokio::test]
async fn logout_clears_and_current_profile_is_none() {
    let (_store, session, _backend, auth) = setup();
    auth.login("analyst", "correct").await.unwrap();

    auth.logout().unwrap();
    auth.logout().unwrap();

    assert!(!session.is_authenticated());
    assert_eq!(auth.current_profile().await.unwrap(), None);
}

#[tokio::test]
async fn current_profile_refreshes_from_backend() {
    let (_store, session, _backend, auth) = setup();
    session.set_token(Some("restored".to_string())).unwrap();
    assert_eq!(session.user(), None);

    let profile = auth.current_profile().await.unwrap().unwrap();
    assert_eq!(profile.username, "analyst");
    assert_eq!(session.user(), Some(profile));
}

#[tokio::test]
async fn register_does_not_sign_in() {
    let (store, session, _backend, auth) = setup();

    let account = auth
        .register(&Registration::new("field-officer", "fo@example.org", "s3cret").with_clearance("L2"))
        .await
        .unwrap();

    assert_eq!(account.username, "field-officer");
    assert_eq!(account.clearance_level, "L2");
    assert!(!session.is_authenticated());
    assert_eq!(store.get("legacy-token").unwrap(), None);
}

#[tokio::test]
async fn register_duplicate_keeps_existing_session() {
    let (_store, session, _backend, auth) = setup();
    auth.login("analyst", "correct").await.unwrap();

    let err = auth
        .register(&Registration::new("analyst", "a@example.org", "x"))
        .await
        .unwrap_err();

    assert!(matches!(err, SurakshError::Validation(_)));
    assert_eq!(session.token().as_deref(), Some("token-for-analyst"));
}
