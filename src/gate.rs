//! Route guard and navigation
//!
//! `AuthGate` decides whether a route may be entered given the session.
//! `Navigator` owns the current route and re-applies the gate whenever the
//! session changes, so a logout while the dashboard is open lands the user
//! back on the landing screen.

use crate::auth::{AuthSession, Session};
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Landing,
    Home,
    Privacy,
    Terms,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Landing => "/",
            Route::Home => "/home",
            Route::Privacy => "/privacy",
            Route::Terms => "/terms",
        }
    }

    pub fn parse(path: &str) -> Option<Route> {
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Some(Route::Landing),
            "/home" => Some(Route::Home),
            "/privacy" => Some(Route::Privacy),
            "/terms" => Some(Route::Terms),
            _ => None,
        }
    }

    pub fn is_protected(&self) -> bool {
        matches!(self, Route::Home)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    Redirect(Route),
}

pub struct AuthGate;

impl AuthGate {
    pub fn evaluate(route: Route, authenticated: bool) -> GateDecision {
        if route.is_protected() && !authenticated {
            GateDecision::Redirect(Route::Landing)
        } else if route == Route::Landing && authenticated {
            GateDecision::Redirect(Route::Home)
        } else {
            GateDecision::Allow
        }
    }

    /// Where a visitor asking for `route` ends up
    pub fn resolve(route: Route, authenticated: bool) -> Route {
        match Self::evaluate(route, authenticated) {
            GateDecision::Allow => route,
            GateDecision::Redirect(target) => target,
        }
    }
}

pub struct Navigator {
    session: Arc<AuthSession>,
    route: watch::Sender<Route>,
}

impl Navigator {
    /// Start at `initial`, gated against the current session
    pub fn new(session: Arc<AuthSession>, initial: Route) -> Self {
        let start = AuthGate::resolve(initial, session.current_user().is_some());
        let (route, _) = watch::channel(start);
        Self { session, route }
    }

    pub fn current(&self) -> Route {
        *self.route.borrow()
    }

    pub fn navigate(&self, requested: Route) -> Route {
        let authenticated = self.session.current_user().is_some();
        let target = AuthGate::resolve(requested, authenticated);
        if target != requested {
            tracing::debug!("Gate redirected {} to {}", requested, target);
        }
        self.set(target);
        target
    }

    /// Re-apply the gate to the current route
    pub fn reconcile(&self) -> Route {
        self.navigate(self.current())
    }

    /// Reconcile once if the session changed since `seen` was last marked
    pub fn reconcile_if_changed(&self, seen: &mut watch::Receiver<Option<Session>>) -> bool {
        if seen.has_changed().unwrap_or(false) {
            seen.borrow_and_update();
            self.reconcile();
            true
        } else {
            false
        }
    }

    fn set(&self, route: Route) {
        self.route.send_if_modified(|current| {
            if *current == route {
                false
            } else {
                tracing::info!("Navigating {} -> {}", current, route);
                *current = route;
                true
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{MemoryStorage, MockProvider, TokenStore};

    fn session() -> Arc<AuthSession> {
        Arc::new(AuthSession::hydrate(
            TokenStore::new(Arc::new(MemoryStorage::new())),
            Arc::new(MockProvider::default()),
        ))
    }

    #[test]
    fn test_gate_decisions() {
        assert_eq!(
            AuthGate::evaluate(Route::Home, false),
            GateDecision::Redirect(Route::Landing)
        );
        assert_eq!(
            AuthGate::evaluate(Route::Landing, true),
            GateDecision::Redirect(Route::Home)
        );
        assert_eq!(AuthGate::evaluate(Route::Home, true), GateDecision::Allow);
        assert_eq!(AuthGate::evaluate(Route::Landing, false), GateDecision::Allow);
        assert_eq!(AuthGate::evaluate(Route::Privacy, false), GateDecision::Allow);
        assert_eq!(AuthGate::evaluate(Route::Terms, true), GateDecision::Allow);
    }

    #[test]
    fn test_route_parse() {
        assert_eq!(Route::parse("/"), Some(Route::Landing));
        assert_eq!(Route::parse(""), Some(Route::Landing));
        assert_eq!(Route::parse("/home/"), Some(Route::Home));
        assert_eq!(Route::parse("/terms"), Some(Route::Terms));
        assert_eq!(Route::parse("/admin"), None);
    }

    #[test]
    fn test_navigator_gates_entry() {
        let session = session();
        let navigator = Navigator::new(session.clone(), Route::Home);
        assert_eq!(navigator.current(), Route::Landing);

        session.login("Ada", "tok");
        assert_eq!(navigator.navigate(Route::Landing), Route::Home);
        assert_eq!(navigator.navigate(Route::Privacy), Route::Privacy);
    }

    #[tokio::test]
    async fn test_navigator_follows_session_changes() {
        let session = session();
        let navigator = Navigator::new(session.clone(), Route::Landing);
        let mut seen = session.subscribe();

        session.login("Ada", "tok");
        assert!(navigator.reconcile_if_changed(&mut seen));
        assert_eq!(navigator.current(), Route::Home);
        assert!(!navigator.reconcile_if_changed(&mut seen));

        session.logout().await;
        assert!(navigator.reconcile_if_changed(&mut seen));
        assert_eq!(navigator.current(), Route::Landing);
    }
}
