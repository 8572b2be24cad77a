//! Node list view with confirmed deletion
//!
//! Deleting goes through a confirmation step: `request_delete` opens the
//! modal, `confirm_delete` closes it and hands out the ticket for the actual
//! request. Nothing is removed locally until the backend confirms.

use crate::auth::AuthSession;
use crate::errors::KnowledgeError;
use crate::knowledge::{KnowledgeClient, Node};
use crate::views::{Alert, Applied, NodeCache, Ticket};

/// Handle for one confirmed delete
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteTicket {
    id: String,
    token: String,
}

impl DeleteTicket {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

#[derive(Debug, Default)]
pub struct NodesView {
    cache: NodeCache,
    selected: usize,
    pending_delete: Option<String>,
}

impl NodesView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[Node] {
        self.cache.nodes()
    }

    pub fn is_loading(&self) -> bool {
        self.cache.is_loading()
    }

    pub fn take_alert(&mut self) -> Option<Alert> {
        self.cache.take_alert()
    }

    pub fn mount(&mut self, session: &AuthSession) -> Result<Ticket, KnowledgeError> {
        self.cache.begin_fetch(session)
    }

    pub fn apply_nodes(
        &mut self,
        ticket: &Ticket,
        result: Result<Vec<Node>, KnowledgeError>,
        session: &AuthSession,
    ) -> Applied {
        let applied = self.cache.apply_fetch(ticket, result, session);
        self.clamp_selection();
        applied
    }

    pub async fn refresh(&mut self, client: &KnowledgeClient, session: &AuthSession) -> Applied {
        let applied = self.cache.refresh(client, session).await;
        self.clamp_selection();
        applied
    }

    pub fn reset(&mut self) {
        self.cache.reset();
        self.selected = 0;
        self.pending_delete = None;
    }

    pub fn selected(&self) -> Option<&Node> {
        self.cache.nodes().get(self.selected)
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.cache.nodes().len() {
            self.selected += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn clamp_selection(&mut self) {
        let len = self.cache.nodes().len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    /// Open the confirmation modal for `id`
    ///
    /// Returns false if the node is unknown or a confirmation is already open.
    pub fn request_delete(&mut self, id: &str) -> bool {
        if self.pending_delete.is_some() || !self.cache.nodes().iter().any(|n| n.id == id) {
            return false;
        }
        self.pending_delete = Some(id.to_string());
        true
    }

    /// The node awaiting confirmation, if the modal is open
    pub fn pending_delete(&self) -> Option<&Node> {
        let id = self.pending_delete.as_deref()?;
        self.cache.nodes().iter().find(|node| node.id == id)
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Close the modal and authorize the delete request
    ///
    /// `None` if nothing was pending or there is no session anymore.
    pub fn confirm_delete(&mut self, session: &AuthSession) -> Option<DeleteTicket> {
        let id = self.pending_delete.take()?;
        let Some(current) = session.current_user() else {
            self.cache.raise(Alert::SessionExpired);
            return None;
        };
        Some(DeleteTicket {
            id,
            token: current.bearer_token,
        })
    }

    pub fn apply_delete(
        &mut self,
        ticket: &DeleteTicket,
        result: Result<(), KnowledgeError>,
        session: &AuthSession,
    ) -> Applied {
        match result {
            Ok(()) if session.is_current_token(&ticket.token) => {
                self.cache.remove(&ticket.id);
                self.clamp_selection();
                Applied::Updated
            }
            Ok(()) => Applied::Stale,
            Err(e) => {
                let alert = Alert::from(&e);
                tracing::warn!("Deleting node {} failed: {}", ticket.id, e);
                self.cache.raise(alert);
                Applied::Failed(alert)
            }
        }
    }

    /// Send a confirmed delete and apply the outcome
    pub async fn delete_confirmed(
        &mut self,
        client: &KnowledgeClient,
        session: &AuthSession,
    ) -> Option<Applied> {
        let ticket = self.confirm_delete(session)?;
        let result = client.delete_node(ticket.token(), ticket.id()).await;
        Some(self.apply_delete(&ticket, result, session))
    }
}
