//! Session credentials and the 401 teardown

use magicsaas_runtime_config::RuntimeConfig;
use magicsaas_telemetry::metrics;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::ApiResult;
use crate::navigation::{LOGIN_ROUTE, Navigator};
use crate::storage::CredentialStore;

/// Owns the token/user storage keys and the redirect on rejection
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
    token_key: String,
    user_key: String,
}

impl Session {
    pub fn new(
        config: &RuntimeConfig,
        store: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            store,
            navigator,
            token_key: config.token_key(),
            user_key: config.user_key(),
        }
    }

    /// Current bearer token, if signed in
    pub fn token(&self) -> ApiResult<Option<String>> {
        Ok(self.store.get(&self.token_key)?)
    }

    /// Signed-in user as stored (opaque JSON text)
    pub fn user(&self) -> ApiResult<Option<String>> {
        Ok(self.store.get(&self.user_key)?)
    }

    /// Persist a new session
    pub fn sign_in(&self, token: &str, user: Option<&serde_json::Value>) -> ApiResult<()> {
        self.store.set(&self.token_key, token)?;
        if let Some(user) = user {
            self.store.set(&self.user_key, &user.to_string())?;
        }
        debug!(key = %self.token_key, "Session stored");
        Ok(())
    }

    /// Remove the token and user
    pub fn sign_out(&self) -> ApiResult<()> {
        self.store.remove(&self.token_key)?;
        self.store.remove(&self.user_key)?;
        Ok(())
    }

    /// Tear down after a 401 and redirect to the login route
    ///
    /// Storage failures are logged; the caller still gets its
    /// `Unauthorized` error.
    pub(crate) fn reject(&self, status: u16) {
        metrics().increment("api.auth_failures");

        if let Err(e) = self.sign_out() {
            warn!(error = %e, "Failed to clear session after {status}");
        }

        let current = self.navigator.current_path();
        if self.navigator.on_login_route() {
            warn!(route = %current, "Session rejected on login route");
        } else {
            warn!(from = %current, to = LOGIN_ROUTE, "Session rejected, redirecting to login");
            self.navigator.navigate(LOGIN_ROUTE);
        }
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::RouteNavigator;
    use crate::storage::MemoryStore;
    use magicsaas_runtime_config::resolver::compute_defaults;
    use magicsaas_runtime_config::{ResolverOptions, StaticHost};
    use serde_json::json;

    fn session(path: &str) -> (Session, Arc<MemoryStore>, Arc<RouteNavigator>) {
        let config = compute_defaults(&StaticHost::new("fashion.magicsaas.com"), &ResolverOptions::default());
        let store = Arc::new(MemoryStore::new());
        let nav = Arc::new(RouteNavigator::new(path));
        (Session::new(&config, store.clone(), nav.clone()), store, nav)
    }

    #[test]
    fn test_sign_in_and_out() {
        let (session, store, _) = session("/");
        session.sign_in("tok", Some(&json!({ "id": 7 }))).unwrap();

        assert_eq!(session.token().unwrap().as_deref(), Some("tok"));
        assert_eq!(store.get("magicsaas_user").unwrap().as_deref(), Some(r#"{"id":7}"#));

        session.sign_out().unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_reject_redirects() {
        let (session, store, nav) = session("/petalas/fashion/cart");
        session.sign_in("tok", Some(&json!({}))).unwrap();

        session.reject(401);

        assert!(store.is_empty());
        assert_eq!(nav.current_path(), "/login");
    }

    #[test]
    fn test_reject_on_login_route_stays() {
        let (session, _, nav) = session("/login");
        session.reject(401);
        assert!(nav.history().is_empty());
    }
}
