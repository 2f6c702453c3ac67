//! Route guard for protected views.
//!
//! ```text
//! Uninitialized --begin()--> Hydrating --resolve()--> Authorized
//!                                                 \-> Unauthorized (redirect to login)
//! ```
//!
//! While `Hydrating`, a protected view shows a neutral loading state: neither
//! its content nor a redirect. The decision is taken only after the hydration
//! delay has elapsed *and* the session has been read from storage, so a valid
//! but not-yet-loaded session never flickers through the login page.

use crate::navigation::{Navigator, Route};
use crate::session::SessionManager;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    /// The client context that can read storage is not established yet.
    Uninitialized,
    /// Client context ready, session not confirmed stable.
    Hydrating,
    Authorized,
    Unauthorized,
}

/// What a protected view should render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    RenderLoading,
    RenderProtected,
    RedirectToLogin,
}

impl From<GuardState> for GuardDecision {
    fn from(state: GuardState) -> Self {
        match state {
            GuardState::Uninitialized | GuardState::Hydrating => GuardDecision::RenderLoading,
            GuardState::Authorized => GuardDecision::RenderProtected,
            GuardState::Unauthorized => GuardDecision::RedirectToLogin,
        }
    }
}

pub struct RouteGuard {
    session: Arc<SessionManager>,
    navigator: Arc<dyn Navigator>,
    hydration_delay: Duration,
    state: Mutex<GuardState>,
}

impl RouteGuard {
    pub fn new(
        session: Arc<SessionManager>,
        navigator: Arc<dyn Navigator>,
        hydration_delay: Duration,
    ) -> Self {
        Self {
            session,
            navigator,
            hydration_delay,
            state: Mutex::new(GuardState::Uninitialized),
        }
    }

    pub fn state(&self) -> GuardState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn decision(&self) -> GuardDecision {
        self.state().into()
    }

    /// Marks the client context as established. Only moves out of
    /// `Uninitialized`; later calls are no-ops.
    pub fn begin(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if *state == GuardState::Uninitialized {
            *state = GuardState::Hydrating;
        }
    }

    /// Waits out the hydration delay and the session rehydration, then
    /// settles on `Authorized` or `Unauthorized`. An unauthorized outcome
    /// navigates to the login view unless it is already showing.
    pub async fn resolve(&self) -> GuardDecision {
        self.begin();
        tokio::time::sleep(self.hydration_delay).await;

        if !self.session.is_hydrated() {
            let session = self.session.clone();
            if let Err(e) = tokio::task::spawn_blocking(move || session.hydrate()).await {
                tracing::warn!("[RouteGuard] Hydration task failed: {}", e);
            }
        }
        self.session.wait_hydrated().await;

        let next = if self.session.is_authenticated() {
            GuardState::Authorized
        } else {
            GuardState::Unauthorized
        };
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = next;

        if next == GuardState::Unauthorized && self.navigator.current_route() != Route::Login {
            tracing::info!("[RouteGuard] No session, redirecting to {}", Route::Login);
            self.navigator.navigate(Route::Login);
        }
        next.into()
    }
}
