use super::model::{SessionRecord, SessionSnapshot, UserProfile};
use crate::error::{Result, SurakshError};
use crate::store::{PersistedStore, keys};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockWriteGuard};
use tokio::sync::watch;

/// Read access to the current credential, plus the teardown hook used on
/// authorization failure.
///
/// The transport only ever talks to the session through this trait.
pub trait CredentialSource: Send + Sync {
    /// Current credential and the generation it belongs to.
    ///
    /// The generation changes every time the credential value changes, so
    /// failures observed for an older generation can be told apart from
    /// failures of the current credential.
    fn credential(&self) -> (Option<String>, u64);

    /// Clears the session if it is still at `generation`.
    ///
    /// Returns `true` when the session at that generation was torn down,
    /// `false` when a newer credential has replaced it in the meantime.
    fn revoke(&self, generation: u64) -> bool;
}

#[derive(Debug, Default)]
struct SessionState {
    token: Option<String>,
    user: Option<UserProfile>,
    hydrated: bool,
}

impl SessionState {
    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            token: self.token.clone(),
            user: self.user.clone(),
        }
    }
}

/// Owns the canonical session and is the only writer of the session record
/// and the legacy token mirror.
///
/// `SessionManager` is responsible for:
/// - Rehydrating the session from the structured record, or migrating it
///   from the legacy mirror when the record is absent or malformed
/// - Keeping the mirror equal to the token (absent when there is none)
/// - Persisting after every mutation
/// - Failing open to "logged out" on any corrupt persisted data
pub struct SessionManager {
    store: Arc<dyn PersistedStore>,
    state: RwLock<SessionState>,
    generation: AtomicU64,
    hydrated_tx: watch::Sender<bool>,
}

impl SessionManager {
    /// Creates an unhydrated manager over `store`. Nothing is read until the
    /// first accessor call or an explicit [`SessionManager::hydrate`].
    pub fn new(store: Arc<dyn PersistedStore>) -> Self {
        let (hydrated_tx, _) = watch::channel(false);
        Self {
            store,
            state: RwLock::new(SessionState::default()),
            generation: AtomicU64::new(0),
            hydrated_tx,
        }
    }

    // ============================================================================
    // Accessors
    // ============================================================================

    /// Returns the current credential, rehydrating from storage first if
    /// needed.
    pub fn token(&self) -> Option<String> {
        self.snapshot().token
    }

    /// Returns the current user profile, if one has been fetched.
    pub fn user(&self) -> Option<UserProfile> {
        self.snapshot().user
    }

    pub fn is_authenticated(&self) -> bool {
        self.snapshot().is_authenticated()
    }

    /// Returns a copy of the whole session.
    pub fn snapshot(&self) -> SessionSnapshot {
        {
            let state = self.state.read().unwrap_or_else(|e| e.into_inner());
            if state.hydrated {
                return state.snapshot();
            }
        }
        self.hydrate()
    }

    /// Whether the in-memory session has been loaded from storage.
    pub fn is_hydrated(&self) -> bool {
        *self.hydrated_tx.borrow()
    }

    /// Current credential generation.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    // ============================================================================
    // Hydration
    // ============================================================================

    /// Loads the session from storage if that has not happened yet and
    /// returns the resulting snapshot.
    pub fn hydrate(&self) -> SessionSnapshot {
        let mut state = self.write_state();
        self.ensure_hydrated(&mut state);
        state.snapshot()
    }

    /// Resolves once the session has been hydrated by any caller.
    pub async fn wait_hydrated(&self) {
        let mut rx = self.hydrated_tx.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = rx.wait_for(|hydrated| *hydrated).await;
    }

    // ============================================================================
    // Mutations
    // ============================================================================

    /// Sets or clears the credential and persists both the record and the
    /// mirror. Clearing the credential also drops the profile.
    ///
    /// Idempotent: setting the same value twice leaves the same state.
    pub fn set_token(&self, token: Option<String>) -> Result<()> {
        let token = token.filter(|t| !t.trim().is_empty());
        let mut state = self.write_state();
        self.ensure_hydrated(&mut state);

        if token.is_none() {
            state.user = None;
        }
        self.replace_token(&mut state, token);
        self.persist(&state)
    }

    /// Attaches or clears the user profile. Never touches the credential.
    ///
    /// A profile cannot be attached while no credential is held.
    pub fn set_user(&self, user: Option<UserProfile>) -> Result<()> {
        let mut state = self.write_state();
        self.ensure_hydrated(&mut state);

        if user.is_some() && state.token.is_none() {
            return Err(SurakshError::validation(
                "cannot attach a user profile without a credential",
            ));
        }
        state.user = user;
        self.persist(&state)
    }

    /// Clears credential, profile and mirror, then persists the empty record.
    /// Calling it while logged out leaves the same state and does not fail.
    pub fn logout(&self) -> Result<()> {
        let mut state = self.write_state();
        self.ensure_hydrated(&mut state);
        self.clear(&mut state)
    }

    // ============================================================================
    // Internals
    // ============================================================================

    fn write_state(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    fn clear(&self, state: &mut SessionState) -> Result<()> {
        state.user = None;
        self.replace_token(state, None);
        tracing::info!("[SessionManager] Session cleared");
        self.persist(state)
    }

    fn replace_token(&self, state: &mut SessionState, token: Option<String>) {
        if state.token != token {
            self.generation.fetch_add(1, Ordering::SeqCst);
            state.token = token;
        }
    }

    fn ensure_hydrated(&self, state: &mut SessionState) {
        if state.hydrated {
            return;
        }

        match self.read_structured() {
            Some(record) => {
                state.user = record.user;
                self.replace_token(state, record.token);
                self.reconcile_mirror(state.token.as_deref());
            }
            None => match self.read_legacy() {
                Some(token) => {
                    tracing::info!(
                        "[SessionManager] Migrating legacy token into the session record"
                    );
                    state.user = None;
                    self.replace_token(state, Some(token));
                    if let Err(e) = self.persist(state) {
                        tracing::warn!("[SessionManager] Legacy token migration not persisted: {}", e);
                    }
                }
                None => {
                    state.user = None;
                    self.replace_token(state, None);
                }
            },
        }

        state.hydrated = true;
        self.hydrated_tx.send_replace(true);
        tracing::debug!(
            "[SessionManager] Hydrated (authenticated: {})",
            state.token.is_some()
        );
    }

    /// Reads the structured record; `None` when absent, unreadable or
    /// malformed.
    fn read_structured(&self) -> Option<SessionRecord> {
        let raw = match self.store.get(keys::SESSION_RECORD) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!("[SessionManager] Failed to read session record: {}", e);
                return None;
            }
        };

        match SessionRecord::parse(&raw) {
            Ok(record) => Some(record),
            Err(reason) => {
                tracing::warn!(
                    "[SessionManager] Ignoring malformed session record: {}",
                    reason
                );
                None
            }
        }
    }

    fn read_legacy(&self) -> Option<String> {
        match self.store.get(keys::LEGACY_TOKEN) {
            Ok(token) => token.filter(|t| !t.trim().is_empty()),
            Err(e) => {
                tracing::warn!("[SessionManager] Failed to read legacy token: {}", e);
                None
            }
        }
    }

    /// Brings the mirror in line with a valid structured record.
    fn reconcile_mirror(&self, token: Option<&str>) {
        let mirror = self.read_legacy();
        if mirror.as_deref() == token {
            return;
        }
        tracing::debug!("[SessionManager] Repairing stale legacy token mirror");
        if let Err(e) = self.write_mirror(token) {
            tracing::warn!("[SessionManager] Failed to repair legacy token mirror: {}", e);
        }
    }

    fn write_mirror(&self, token: Option<&str>) -> Result<()> {
        match token {
            Some(token) => self.store.set(keys::LEGACY_TOKEN, token),
            None => self.store.remove(keys::LEGACY_TOKEN),
        }
    }

    /// Writes the record, then the mirror. Each write is atomic on its own;
    /// the mirror is attempted even if the record write failed.
    fn persist(&self, state: &SessionState) -> Result<()> {
        let record = SessionRecord {
            token: state.token.clone(),
            user: state.user.clone(),
            ..SessionRecord::default()
        };
        let json = serde_json::to_string(&record)?;

        let record_result = self.store.set(keys::SESSION_RECORD, &json);
        let mirror_result = self.write_mirror(state.token.as_deref());

        if let Err(ref e) = record_result {
            tracing::warn!("[SessionManager] Failed to persist session record: {}", e);
        }
        if let Err(ref e) = mirror_result {
            tracing::warn!("[SessionManager] Failed to persist legacy token mirror: {}", e);
        }
        record_result.and(mirror_result)
    }
}

impl CredentialSource for SessionManager {
    fn credential(&self) -> (Option<String>, u64) {
        self.snapshot();
        // The generation only moves under the write lock, so reading both
        // under the read lock yields a matching pair.
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        (state.token.clone(), self.generation())
    }

    fn revoke(&self, generation: u64) -> bool {
        let mut state = self.write_state();
        self.ensure_hydrated(&mut state);
        if self.generation() != generation {
            tracing::debug!(
                "[SessionManager] Ignoring revoke for stale generation {} (current {})",
                generation,
                self.generation()
            );
            return false;
        }
        if let Err(e) = self.clear(&mut state) {
            tracing::warn!("[SessionManager] Teardown not fully persisted: {}", e);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;

    fn profile() -> UserProfile {
        UserProfile {
            username: "analyst".to_string(),
            email: "analyst@example.org".to_string(),
            clearance_level: "L2".to_string(),
        }
    }

    fn manager() -> (Arc<InMemoryStore>, SessionManager) {
        let store = Arc::new(InMemoryStore::new());
        let manager = SessionManager::new(store.clone());
        (store, manager)
    }

    #[test]
    fn test_starts_logged_out() {
        let (_, manager) = manager();
        assert!(!manager.is_hydrated());
        assert_eq!(manager.token(), None);
        assert!(manager.is_hydrated());
    }

    #[test]
    fn test_set_token_writes_record_and_mirror() {
        let (store, manager) = manager();
        manager.set_token(Some("abc".to_string())).unwrap();

        let raw = store.get(keys::SESSION_RECORD).unwrap().unwrap();
        let record = SessionRecord::parse(&raw).unwrap();
        assert_eq!(record.token.as_deref(), Some("abc"));
        assert_eq!(store.get(keys::LEGACY_TOKEN).unwrap().as_deref(), Some("abc"));
    }

    #[test]
    fn test_clearing_token_drops_user_and_mirror() {
        let (store, manager) = manager();
        manager.set_token(Some("abc".to_string())).unwrap();
        manager.set_user(Some(profile())).unwrap();

        manager.set_token(None).unwrap();

        assert_eq!(manager.snapshot(), SessionSnapshot::default());
        assert_eq!(store.get(keys::LEGACY_TOKEN).unwrap(), None);
    }

    #[test]
    fn test_set_user_requires_credential() {
        let (_, manager) = manager();
        let err = manager.set_user(Some(profile())).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(manager.user(), None);
    }

    #[test]
    fn test_set_user_keeps_token() {
        let (_, manager) = manager();
        manager.set_token(Some("abc".to_string())).unwrap();
        manager.set_user(Some(profile())).unwrap();
        manager.set_user(None).unwrap();
        assert_eq!(manager.token().as_deref(), Some("abc"));
    }

    #[test]
    fn test_generation_changes_only_with_token_value() {
        let (_, manager) = manager();
        manager.hydrate();
        let start = manager.generation();

        manager.set_token(Some("abc".to_string())).unwrap();
        let after_login = manager.generation();
        assert!(after_login > start);

        manager.set_token(Some("abc".to_string())).unwrap();
        manager.set_user(Some(profile())).unwrap();
        assert_eq!(manager.generation(), after_login);
    }

    #[test]
    fn test_revoke_ignores_stale_generation() {
        let (_, manager) = manager();
        manager.set_token(Some("old".to_string())).unwrap();
        let (_, stale) = manager.credential();
        manager.set_token(Some("new".to_string())).unwrap();

        assert!(!manager.revoke(stale));
        assert_eq!(manager.token().as_deref(), Some("new"));

        let (_, current) = manager.credential();
        assert!(manager.revoke(current));
        assert_eq!(manager.token(), None);
    }

    #[test]
    fn test_stale_mirror_is_repaired_on_hydrate() {
        let store = Arc::new(InMemoryStore::new());
        store
            .set(keys::SESSION_RECORD, r#"{"token":null,"user":null,"schemaVersion":1}"#)
            .unwrap();
        store.set(keys::LEGACY_TOKEN, "leftover").unwrap();

        let manager = SessionManager::new(store.clone());
        assert_eq!(manager.token(), None);
        assert_eq!(store.get(keys::LEGACY_TOKEN).unwrap(), None);
    }

    #[tokio::test]
    async fn test_wait_hydrated_resolves_after_hydrate() {
        let (_, manager) = manager();
        let manager = Arc::new(manager);

        let waiter = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.wait_hydrated().await })
        };
        tokio::task::yield_now().await;
        manager.hydrate();

        waiter.await.unwrap();
        assert!(manager.is_hydrated());
    }
}
