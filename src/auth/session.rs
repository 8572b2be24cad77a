//! Authenticated session state
//!
//! `AuthSession` is the single in-memory authority for who is signed in.
//! The state lives in a `watch` channel so every dependent (the navigator,
//! the views, the TUI loop) can observe transitions. The [`TokenStore`] is
//! only touched at three points: `hydrate` at startup, `persist` on login and
//! `clear` on logout.

use crate::auth::provider::IdentityProvider;
use crate::auth::store::TokenStore;
use crate::errors::AuthError;
use crate::knowledge::SessionInvalidation;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::watch;

/// The authenticated identity for this process
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub display_name: String,
    pub bearer_token: String,
}

impl Session {
    pub fn new(display_name: impl Into<String>, bearer_token: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            bearer_token: bearer_token.into(),
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("display_name", &self.display_name)
            .field("bearer_token", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    Authenticated,
}

pub struct AuthSession {
    state: watch::Sender<Option<Session>>,
    store: TokenStore,
    provider: Arc<dyn IdentityProvider>,
}

impl AuthSession {
    /// Start from whatever the token store holds
    pub fn hydrate(store: TokenStore, provider: Arc<dyn IdentityProvider>) -> Self {
        let initial = match store.load() {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("Could not read stored session, starting signed out: {}", e);
                None
            }
        };

        match &initial {
            Some(session) => tracing::info!("Restored session for {}", session.display_name),
            None => tracing::debug!("No stored session"),
        }

        let (state, _) = watch::channel(initial);
        Self {
            state,
            store,
            provider,
        }
    }

    pub fn current_user(&self) -> Option<Session> {
        self.state.borrow().clone()
    }

    pub fn state(&self) -> AuthState {
        if self.state.borrow().is_some() {
            AuthState::Authenticated
        } else {
            AuthState::Unauthenticated
        }
    }

    /// Whether `token` still belongs to the current session
    pub fn is_current_token(&self, token: &str) -> bool {
        self.state
            .borrow()
            .as_ref()
            .is_some_and(|session| session.bearer_token == token)
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.state.subscribe()
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Become authenticated as `display_name`
    ///
    /// Empty arguments are ignored. A storage failure does not undo the
    /// login; the session just won't survive a restart.
    pub fn login(&self, display_name: &str, bearer_token: &str) {
        if display_name.is_empty() || bearer_token.is_empty() {
            tracing::warn!("Ignoring login with an empty display name or token");
            return;
        }

        let session = Session::new(display_name, bearer_token);
        self.state.send_replace(Some(session.clone()));
        self.persist(&session);
        tracing::info!("Logged in as {}", session.display_name);
    }

    fn persist(&self, session: &Session) {
        if let Err(e) = self.store.save(session) {
            tracing::warn!("Session kept in memory only: {}", e);
        }
    }

    /// Tear down the session locally, then sign out at the provider
    ///
    /// Always succeeds locally. Calling it while signed out is a no-op apart
    /// from clearing the store again.
    pub async fn logout(&self) {
        let previous = self.state.send_replace(None);

        if let Err(e) = self.store.clear() {
            tracing::warn!("Failed to clear stored session: {}", e);
        }

        let Some(previous) = previous else {
            tracing::debug!("Logout requested while already signed out");
            return;
        };

        tracing::info!("Logged out {}", previous.display_name);
        if let Err(e) = self.provider.sign_out().await {
            tracing::warn!("{} sign-out failed (ignored): {}", self.provider.name(), e);
        }
    }

    /// Run the provider's interactive sign-in and log in with the result
    pub async fn sign_in(&self) -> Result<Session, AuthError> {
        tracing::info!("Starting {} sign-in", self.provider.name());
        let result = self.provider.sign_in().await?;

        if result.display_name.is_empty() {
            return Err(AuthError::EmptyCredential("display name"));
        }
        if result.bearer_token.is_empty() {
            return Err(AuthError::EmptyCredential("bearer token"));
        }

        self.login(&result.display_name, &result.bearer_token);
        Ok(Session::new(result.display_name, result.bearer_token))
    }
}

#[async_trait]
impl SessionInvalidation for AuthSession {
    async fn session_invalid(&self, token: &str) {
        // A rejection of an earlier session's token leaves the current one alone
        if !self.is_current_token(token) {
            tracing::debug!("Ignoring rejection of a replaced token");
            return;
        }
        tracing::warn!("Backend rejected the session token, signing out");
        self.logout().await;
    }
}
