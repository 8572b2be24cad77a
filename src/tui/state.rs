//! State management for the Terminal UI
//!
//! Network work runs in spawned tasks that report back over an mpsc channel;
//! everything is applied on the UI loop in [`TuiState::tick`].

use crate::auth::{AuthSession, Session};
use crate::commands::Services;
use crate::errors::{AuthError, KnowledgeError};
use crate::gate::{Navigator, Route};
use crate::knowledge::{KnowledgeClient, Node};
use crate::views::{Alert, DeleteTicket, NodesView, SearchView, Ticket};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// Dashboard sections in the sidebar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Assistant,
    Nodes,
}

impl Tab {
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Assistant => "Assistant",
            Tab::Nodes => "Nodes",
        }
    }

    pub fn next(&self) -> Tab {
        match self {
            Tab::Assistant => Tab::Nodes,
            Tab::Nodes => Tab::Assistant,
        }
    }
}

/// Completed background work
pub enum TaskResult {
    Nodes {
        tab: Tab,
        ticket: Ticket,
        result: Result<Vec<Node>, KnowledgeError>,
    },
    Deleted {
        ticket: DeleteTicket,
        result: Result<(), KnowledgeError>,
    },
    SignIn(Result<Session, AuthError>),
}

/// State for the TUI application
pub struct TuiState {
    pub session: Arc<AuthSession>,
    pub client: Arc<KnowledgeClient>,
    pub navigator: Navigator,
    session_seen: watch::Receiver<Option<Session>>,
    /// Route the dashboard was last synced to; None before the first tick
    mounted_route: Option<Route>,
    pub tab: Tab,
    pub search: SearchView,
    pub nodes: NodesView,
    /// Alert popup awaiting dismissal
    pub alert: Option<Alert>,
    /// One-line status for the landing screen
    pub status: Option<String>,
    pub signing_in: bool,
    pub show_help: bool,
    pub should_quit: bool,
    tx: mpsc::UnboundedSender<TaskResult>,
    rx: mpsc::UnboundedReceiver<TaskResult>,
}

impl TuiState {
    pub fn new(services: &Services) -> Self {
        let session = services.session.clone();
        let navigator = Navigator::new(session.clone(), Route::Home);
        let session_seen = session.subscribe();
        let (tx, rx) = mpsc::unbounded_channel();

        Self {
            session,
            client: services.client.clone(),
            navigator,
            session_seen,
            mounted_route: None,
            tab: Tab::Assistant,
            search: SearchView::new(),
            nodes: NodesView::new(),
            alert: None,
            status: None,
            signing_in: false,
            show_help: false,
            should_quit: false,
            tx,
            rx,
        }
    }

    pub fn route(&self) -> Route {
        self.navigator.current()
    }

    pub fn display_name(&self) -> Option<String> {
        self.session.current_user().map(|s| s.display_name)
    }

    /// Apply finished tasks and follow session changes
    pub fn tick(&mut self) {
        while let Ok(result) = self.rx.try_recv() {
            self.apply(result);
        }
        self.navigator.reconcile_if_changed(&mut self.session_seen);
        self.sync_route();
    }

    fn sync_route(&mut self) {
        let route = self.route();
        if self.mounted_route == Some(route) {
            return;
        }
        let was_home = self.mounted_route == Some(Route::Home);
        self.mounted_route = Some(route);

        if route == Route::Home {
            self.status = None;
            self.fetch(Tab::Assistant);
            self.fetch(Tab::Nodes);
        } else if was_home {
            // Nothing of the previous user's data outlives the dashboard
            self.search.reset();
            self.nodes.reset();
            self.tab = Tab::Assistant;
        }
    }

    /// Start a node fetch for one view
    pub fn fetch(&mut self, tab: Tab) {
        let mounted = match tab {
            Tab::Assistant => self.search.mount(&self.session),
            Tab::Nodes => self.nodes.mount(&self.session),
        };
        let ticket = match mounted {
            Ok(ticket) => ticket,
            Err(_) => {
                self.collect_alerts();
                self.spawn_logout();
                return;
            }
        };

        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = client.list_nodes(ticket.token()).await;
            let _ = tx.send(TaskResult::Nodes {
                tab,
                ticket,
                result,
            });
        });
    }

    /// Send the delete confirmed in the modal
    pub fn confirm_delete(&mut self) {
        let Some(ticket) = self.nodes.confirm_delete(&self.session) else {
            self.collect_alerts();
            return;
        };

        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = client.delete_node(ticket.token(), ticket.id()).await;
            let _ = tx.send(TaskResult::Deleted { ticket, result });
        });
    }

    pub fn sign_in(&mut self) {
        if self.signing_in {
            return;
        }
        self.signing_in = true;
        self.status = Some("Complete the sign-in in your browser...".to_string());

        let session = self.session.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = session.sign_in().await;
            let _ = tx.send(TaskResult::SignIn(result));
        });
    }

    pub fn logout(&mut self) {
        self.status = Some("Signed out.".to_string());
        self.spawn_logout();
    }

    fn spawn_logout(&self) {
        let session = self.session.clone();
        tokio::spawn(async move { session.logout().await });
    }

    fn apply(&mut self, result: TaskResult) {
        let applied = match result {
            TaskResult::Nodes { tab, ticket, result } => match tab {
                Tab::Assistant => self.search.apply_nodes(&ticket, result, &self.session),
                Tab::Nodes => self.nodes.apply_nodes(&ticket, result, &self.session),
            },
            TaskResult::Deleted { ticket, result } => {
                self.nodes.apply_delete(&ticket, result, &self.session)
            }
            TaskResult::SignIn(result) => {
                self.signing_in = false;
                match result {
                    Ok(session) => tracing::info!("Signed in as {}", session.display_name),
                    Err(e) => {
                        tracing::warn!("Sign-in failed: {}", e);
                        self.status = Some(format!("Sign-in failed: {}", e));
                    }
                }
                return;
            }
        };

        if applied.requires_logout() {
            self.spawn_logout();
        }
        self.collect_alerts();
    }

    fn collect_alerts(&mut self) {
        let raised = self.search.take_alert().or(self.nodes.take_alert());
        if raised.is_some() {
            self.alert = raised;
        }
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }
}
