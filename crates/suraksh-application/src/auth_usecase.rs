//! Authentication use case.

use std::sync::Arc;
use suraksh_core::backend::{CurrentUser, IntelligenceBackend, Registration};
use suraksh_core::error::Result;
use suraksh_core::session::{SessionManager, UserProfile};

/// Orchestrates login and logout between the backend and the session.
///
/// The session manager stays the only writer of the persisted session; this
/// use case only decides when to call it.
pub struct AuthUseCase {
    session: Arc<SessionManager>,
    backend: Arc<dyn IntelligenceBackend>,
}

impl AuthUseCase {
    pub fn new(session: Arc<SessionManager>, backend: Arc<dyn IntelligenceBackend>) -> Self {
        Self { session, backend }
    }

    /// Exchanges credentials for a token, then fetches and attaches the
    /// profile.
    ///
    /// If the profile cannot be fetched the fresh token is dropped again, so
    /// a failed login never leaves a half-established session behind.
    pub async fn login(&self, username: &str, password: &str) -> Result<UserProfile> {
        let token = self.backend.login(username, password).await?;
        self.session.set_token(Some(token.access_token))?;

        let account = match self.backend.current_user().await {
            Ok(account) => account,
            Err(e) => {
                tracing::warn!("[AuthUseCase] Profile fetch failed after login: {}", e);
                if let Err(clear_err) = self.session.logout() {
                    tracing::warn!("[AuthUseCase] Failed to roll back login: {}", clear_err);
                }
                return Err(e);
            }
        };

        let profile = account.profile();
        self.session.set_user(Some(profile.clone()))?;
        tracing::info!(
            "[AuthUseCase] Logged in as {} (clearance {})",
            profile.username,
            profile.clearance_level
        );
        Ok(profile)
    }

    /// Creates an account. The current session, if any, is left untouched.
    pub async fn register(&self, registration: &Registration) -> Result<CurrentUser> {
        let account = self.backend.register(registration).await?;
        tracing::info!(
            "[AuthUseCase] Registered {} (clearance {})",
            account.username,
            account.clearance_level
        );
        Ok(account)
    }

    pub fn logout(&self) -> Result<()> {
        self.session.logout()
    }

    /// The profile of the current session, refreshed from the backend.
    ///
    /// Returns `Ok(None)` when logged out. A 401 during the refresh tears the
    /// session down through the transport and surfaces as an error.
    pub async fn current_profile(&self) -> Result<Option<UserProfile>> {
        if !self.session.is_authenticated() {
            return Ok(None);
        }
        let profile = self.backend.current_user().await?.profile();
        if self.session.user().as_ref() != Some(&profile) {
            self.session.set_user(Some(profile.clone()))?;
        }
        Ok(Some(profile))
    }
}
