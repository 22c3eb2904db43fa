//! Route navigation used by the session guard

use std::sync::{PoisonError, RwLock};

/// Route the client redirects to when the session is rejected
pub const LOGIN_ROUTE: &str = "/login";

/// The host application's router
pub trait Navigator: Send + Sync {
    /// Path of the current route
    fn current_path(&self) -> String;

    /// Move to `path`
    fn navigate(&self, path: &str);

    /// Whether the current route is a login route
    fn on_login_route(&self) -> bool {
        self.current_path().contains(LOGIN_ROUTE)
    }
}

/// In-memory router that records every navigation
#[derive(Debug)]
pub struct RouteNavigator {
    current: RwLock<String>,
    history: RwLock<Vec<String>>,
}

impl Default for RouteNavigator {
    fn default() -> Self {
        Self::new("/")
    }
}

impl RouteNavigator {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            current: RwLock::new(initial.into()),
            history: RwLock::new(Vec::new()),
        }
    }

    /// Paths navigated to, oldest first
    pub fn history(&self) -> Vec<String> {
        self.history
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for RouteNavigator {
    fn current_path(&self) -> String {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn navigate(&self, path: &str) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = path.to_string();
        self.history
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_navigator() {
        let nav = RouteNavigator::new("/petalas/fashion/cart");
        assert!(!nav.on_login_route());

        nav.navigate(LOGIN_ROUTE);
        assert_eq!(nav.current_path(), "/login");
        assert!(nav.on_login_route());
        assert_eq!(nav.history(), vec!["/login".to_string()]);
    }

    #[test]
    fn test_nested_login_route() {
        let nav = RouteNavigator::new("/petalas/fashion/login?next=/cart");
        assert!(nav.on_login_route());
    }
}
