//! Dashboard views
//!
//! Views are plain state machines. Fetches are started with a [`Ticket`],
//! run elsewhere (a spawned task or an awaited call) and handed back through
//! `apply_*`. A ticket carries a generation number and the token it was
//! issued under; results whose generation is outdated, or whose token no
//! longer belongs to the session, are dropped.

pub mod nodes;
pub mod search;

pub use nodes::{DeleteTicket, NodesView};
pub use search::{keyword_search, SearchMode, SearchView};

use crate::auth::AuthSession;
use crate::constants::{REQUEST_FAILED_MESSAGE, SESSION_EXPIRED_MESSAGE};
use crate::errors::KnowledgeError;
use crate::knowledge::{KnowledgeClient, Node};

/// Handle for one in-flight fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    token: String,
}

impl Ticket {
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Monotonic generation counter
#[derive(Debug, Default)]
pub struct RequestFence {
    current: u64,
}

impl RequestFence {
    pub fn issue(&mut self, token: &str) -> Ticket {
        self.current += 1;
        Ticket {
            generation: self.current,
            token: token.to_string(),
        }
    }

    pub fn is_latest(&self, ticket: &Ticket) -> bool {
        ticket.generation == self.current
    }

    pub fn is_current(&self, ticket: &Ticket, session: &AuthSession) -> bool {
        self.is_latest(ticket) && session.is_current_token(&ticket.token)
    }
}

/// User-visible failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alert {
    SessionExpired,
    RequestFailed,
}

impl Alert {
    pub fn message(&self) -> &'static str {
        match self {
            Alert::SessionExpired => SESSION_EXPIRED_MESSAGE,
            Alert::RequestFailed => REQUEST_FAILED_MESSAGE,
        }
    }
}

impl From<&KnowledgeError> for Alert {
    fn from(err: &KnowledgeError) -> Self {
        match err {
            KnowledgeError::SessionInvalid => Alert::SessionExpired,
            KnowledgeError::RequestFailed(_) => Alert::RequestFailed,
        }
    }
}

/// What happened when a result was handed back to a view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Updated,
    /// Superseded by a newer request or by a session change
    Stale,
    Failed(Alert),
}

impl Applied {
    /// The caller must make sure the session is torn down
    pub fn requires_logout(&self) -> bool {
        matches!(self, Applied::Failed(Alert::SessionExpired))
    }
}

/// Read-through cache of the node list, owned by one view
#[derive(Debug, Default)]
pub struct NodeCache {
    nodes: Vec<Node>,
    loading: bool,
    fence: RequestFence,
    alert: Option<Alert>,
}

impl NodeCache {
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn alert(&self) -> Option<Alert> {
        self.alert
    }

    pub fn take_alert(&mut self) -> Option<Alert> {
        self.alert.take()
    }

    pub(crate) fn raise(&mut self, alert: Alert) {
        self.alert = Some(alert);
    }

    /// Start a fetch. Without a session the view is unusable.
    pub fn begin_fetch(&mut self, session: &AuthSession) -> Result<Ticket, KnowledgeError> {
        let Some(current) = session.current_user() else {
            self.loading = false;
            self.alert = Some(Alert::SessionExpired);
            return Err(KnowledgeError::SessionInvalid);
        };

        self.loading = true;
        Ok(self.fence.issue(&current.bearer_token))
    }

    pub fn apply_fetch(
        &mut self,
        ticket: &Ticket,
        result: Result<Vec<Node>, KnowledgeError>,
        session: &AuthSession,
    ) -> Applied {
        // A rejected token is reported even though the interceptor has
        // usually signed the session out by now
        let rejected = matches!(result, Err(KnowledgeError::SessionInvalid));
        let usable = if rejected {
            self.fence.is_latest(ticket)
        } else {
            self.fence.is_current(ticket, session)
        };
        if !usable {
            tracing::debug!("Dropping stale node list (generation {})", ticket.generation);
            return Applied::Stale;
        }

        self.loading = false;
        match result {
            Ok(nodes) => {
                self.nodes = nodes;
                Applied::Updated
            }
            Err(e) => {
                // Prior cached nodes stay as they were
                let alert = Alert::from(&e);
                tracing::warn!("Fetching nodes failed: {}", e);
                self.alert = Some(alert);
                Applied::Failed(alert)
            }
        }
    }

    /// Fetch and apply in one go
    pub async fn refresh(&mut self, client: &KnowledgeClient, session: &AuthSession) -> Applied {
        let ticket = match self.begin_fetch(session) {
            Ok(ticket) => ticket,
            Err(e) => return Applied::Failed(Alert::from(&e)),
        };
        let result = client.list_nodes(ticket.token()).await;
        self.apply_fetch(&ticket, result, session)
    }

    /// Forget cached nodes, e.g. when the user leaves the dashboard
    ///
    /// The fence keeps counting: a fetch still in flight is dropped unless
    /// it reports a rejected token, and any later mount supersedes it.
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.loading = false;
        self.alert = None;
    }

    pub(crate) fn remove(&mut self, id: &str) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|node| node.id != id);
        self.nodes.len() != before
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::auth::{AuthSession, MemoryStorage, MockProvider, TokenStore};
    use crate::knowledge::Node;
    use std::sync::Arc;

    pub fn signed_in(token: &str) -> AuthSession {
        let session = AuthSession::hydrate(
            TokenStore::new(Arc::new(MemoryStorage::new())),
            Arc::new(MockProvider::default()),
        );
        session.login("Ada", token);
        session
    }

    pub fn node(id: &str, title: &str) -> Node {
        Node {
            id: id.to_string(),
            title: Some(title.to_string()),
            description: None,
            content: None,
            url: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{node, signed_in};
    use super::*;

    #[test]
    fn test_newer_fetch_wins_over_slower_older_one() {
        let session = signed_in("tok");
        let mut cache = NodeCache::default();

        let first = cache.begin_fetch(&session).unwrap();
        let second = cache.begin_fetch(&session).unwrap();
        assert!(second.generation() > first.generation());

        assert_eq!(
            cache.apply_fetch(&second, Ok(vec![node("new", "New")]), &session),
            Applied::Updated
        );
        assert_eq!(
            cache.apply_fetch(&first, Ok(vec![node("old", "Old")]), &session),
            Applied::Stale
        );
        assert_eq!(cache.nodes()[0].id, "new");
    }

    #[tokio::test]
    async fn test_result_after_logout_is_discarded() {
        let session = signed_in("tok");
        let mut cache = NodeCache::default();
        let ticket = cache.begin_fetch(&session).unwrap();

        session.logout().await;
        assert_eq!(
            cache.apply_fetch(&ticket, Ok(vec![node("a", "A")]), &session),
            Applied::Stale
        );
        assert!(cache.nodes().is_empty());
    }

    #[test]
    fn test_result_for_replaced_session_is_discarded() {
        let session = signed_in("tok-a");
        let mut cache = NodeCache::default();
        let ticket = cache.begin_fetch(&session).unwrap();

        session.login("Grace", "tok-b");
        assert_eq!(
            cache.apply_fetch(&ticket, Ok(vec![node("a", "A")]), &session),
            Applied::Stale
        );
    }

    #[test]
    fn test_failed_fetch_keeps_prior_nodes() {
        let session = signed_in("tok");
        let mut cache = NodeCache::default();

        let ticket = cache.begin_fetch(&session).unwrap();
        cache.apply_fetch(&ticket, Ok(vec![node("a", "A")]), &session);

        let ticket = cache.begin_fetch(&session).unwrap();
        let applied = cache.apply_fetch(
            &ticket,
            Err(KnowledgeError::RequestFailed("HTTP 500".into())),
            &session,
        );
        assert_eq!(applied, Applied::Failed(Alert::RequestFailed));
        assert!(!applied.requires_logout());
        assert_eq!(cache.nodes().len(), 1);
        assert!(!cache.is_loading());
        assert_eq!(cache.take_alert(), Some(Alert::RequestFailed));
        assert_eq!(cache.alert(), None);
    }

    #[tokio::test]
    async fn test_rejection_reported_after_interceptor_logout() {
        let session = signed_in("tok");
        let mut cache = NodeCache::default();
        let ticket = cache.begin_fetch(&session).unwrap();

        session.logout().await;
        let applied = cache.apply_fetch(&ticket, Err(KnowledgeError::SessionInvalid), &session);
        assert_eq!(applied, Applied::Failed(Alert::SessionExpired));
    }

    #[tokio::test]
    async fn test_reset_then_remount_supersedes_in_flight_fetch() {
        let session = signed_in("tok");
        let mut cache = NodeCache::default();
        let ticket = cache.begin_fetch(&session).unwrap();
        cache.apply_fetch(&ticket, Ok(vec![node("a", "A")]), &session);

        let in_flight = cache.begin_fetch(&session).unwrap();
        session.logout().await;
        cache.reset();
        assert!(cache.nodes().is_empty());
        assert!(!cache.is_loading());

        session.login("Grace", "tok-2");
        let fresh = cache.begin_fetch(&session).unwrap();
        assert_eq!(
            cache.apply_fetch(&in_flight, Err(KnowledgeError::SessionInvalid), &session),
            Applied::Stale
        );
        assert_eq!(
            cache.apply_fetch(&fresh, Ok(vec![node("b", "B")]), &session),
            Applied::Updated
        );
    }

    #[test]
    fn test_session_invalid_requires_logout() {
        let session = signed_in("tok");
        let mut cache = NodeCache::default();
        let ticket = cache.begin_fetch(&session).unwrap();

        let applied = cache.apply_fetch(&ticket, Err(KnowledgeError::SessionInvalid), &session);
        assert!(applied.requires_logout());
        assert_eq!(
            cache.alert().map(|a| a.message()),
            Some("Session expired. Please login again.")
        );
    }
}
