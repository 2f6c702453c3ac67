use std::sync::Mutex;
use suraksh_core::navigation::{Navigator, Route};

/// Navigator for a one-shot terminal command.
///
/// The "current view" is the command being run. A redirect to the login view
/// cannot switch screens, so it tells the user how to get there instead.
pub struct TerminalNavigator {
    current: Mutex<Route>,
}

impl TerminalNavigator {
    pub fn new(route: Route) -> Self {
        Self {
            current: Mutex::new(route),
        }
    }

    pub fn redirected_to_login(&self) -> bool {
        self.current_route() == Route::Login
    }
}

impl Navigator for TerminalNavigator {
    fn current_route(&self) -> Route {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn navigate(&self, route: Route) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if *current == route {
            return;
        }
        *current = route;
        tracing::debug!("[TerminalNavigator] -> {}", route);
        if route == Route::Login {
            eprintln!("🔒 Sign-in required. Run `suraksh login <username>`.");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_switches_current_route() {
        let navigator = TerminalNavigator::new(Route::Vault);
        assert!(!navigator.redirected_to_login());
        navigator.navigate(Route::Login);
        assert!(navigator.redirected_to_login());
        navigator.navigate(Route::Login);
        assert_eq!(navigator.current_route(), Route::Login);
    }
}
