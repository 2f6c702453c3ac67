//! Routes and the navigation seam used for login redirects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;

/// Views of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Route {
    Login,
    Dashboard,
    Vault,
    Graph,
    Search,
    DeepSearch,
    Notifications,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Dashboard => "/dashboard",
            Route::Vault => "/vault",
            Route::Graph => "/graph",
            Route::Search => "/search",
            Route::DeepSearch => "/deepsearch",
            Route::Notifications => "/notifications",
        }
    }

    /// Every view except the login page requires a session.
    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::Login)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Navigation side effects.
///
/// Implementations must not inspect other components; the transport and the
/// route guard only need "where am I" and "go there".
pub trait Navigator: Send + Sync {
    fn current_route(&self) -> Route;
    fn navigate(&self, route: Route);
}

/// Navigator that only tracks the current route and records every
/// navigation it was asked to perform.
#[derive(Debug)]
pub struct RecordingNavigator {
    state: Mutex<(Route, Vec<Route>)>,
}

impl RecordingNavigator {
    pub fn new(start: Route) -> Self {
        Self {
            state: Mutex::new((start, Vec::new())),
        }
    }

    /// All routes navigated to, in order.
    pub fn history(&self) -> Vec<Route> {
        self.state
            .lock()
            .map(|state| state.1.clone())
            .unwrap_or_default()
    }

    /// Number of navigations to `route`.
    pub fn count(&self, route: Route) -> usize {
        self.history().iter().filter(|r| **r == route).count()
    }
}

impl Navigator for RecordingNavigator {
    fn current_route(&self) -> Route {
        self.state
            .lock()
            .map(|state| state.0)
            .unwrap_or(Route::Login)
    }

    fn navigate(&self, route: Route) {
        if let Ok(mut state) = self.state.lock() {
            state.0 = route;
            state.1.push(route);
        }
        tracing::debug!("[Navigator] navigated to {}", route);
    }
}
