//! Assistant search view

use crate::auth::AuthSession;
use crate::constants::{KEYWORD_HINT_MESSAGE, MIN_KEYWORD_QUERY_CHARS};
use crate::errors::KnowledgeError;
use crate::knowledge::{KnowledgeClient, Node};
use crate::views::{Alert, Applied, NodeCache, Ticket};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    /// Served by the external search backend
    #[default]
    Semantic,
    /// Local substring match over the fetched nodes
    Keyword,
}

impl SearchMode {
    pub const ALL: [SearchMode; 2] = [SearchMode::Semantic, SearchMode::Keyword];

    pub fn label(&self) -> &'static str {
        match self {
            SearchMode::Semantic => "Neural Search",
            SearchMode::Keyword => "Keyword Search",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SearchMode::Semantic => "AI-powered semantic search",
            SearchMode::Keyword => "Search by keywords",
        }
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            SearchMode::Semantic => "Ask anything about your notes...",
            SearchMode::Keyword => "Search by keywords...",
        }
    }

    pub fn toggled(&self) -> SearchMode {
        match self {
            SearchMode::Semantic => SearchMode::Keyword,
            SearchMode::Keyword => SearchMode::Semantic,
        }
    }
}

impl std::str::FromStr for SearchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "semantic" | "neural" | "ai" => Ok(SearchMode::Semantic),
            "keyword" | "manual" => Ok(SearchMode::Keyword),
            _ => Err(format!(
                "Unknown search mode: {}. Valid options: semantic, keyword",
                s
            )),
        }
    }
}

/// Keyword matches; shorter queries than the minimum match nothing
pub fn keyword_search<'a>(nodes: &'a [Node], query: &str) -> Vec<&'a Node> {
    if query.chars().count() < MIN_KEYWORD_QUERY_CHARS {
        return Vec::new();
    }
    let needle = query.to_lowercase();
    nodes
        .iter()
        .filter(|node| node.matches_keyword(&needle))
        .collect()
}

#[derive(Debug, Default)]
pub struct SearchView {
    mode: SearchMode,
    query: String,
    cache: NodeCache,
}

impl SearchView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mode: SearchMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    pub fn toggle_mode(&mut self) {
        self.mode = self.mode.toggled();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn push_char(&mut self, c: char) {
        self.query.push(c);
    }

    pub fn pop_char(&mut self) {
        self.query.pop();
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

    /// Whether a result list is shown at all for the current input
    pub fn shows_results(&self) -> bool {
        self.mode == SearchMode::Keyword
            && self.query.chars().count() >= MIN_KEYWORD_QUERY_CHARS
    }

    /// Local results for the current mode and query
    pub fn results(&self) -> Vec<&Node> {
        match self.mode {
            SearchMode::Semantic => Vec::new(),
            SearchMode::Keyword => keyword_search(self.cache.nodes(), &self.query),
        }
    }

    /// Hint while a keyword query is too short
    pub fn hint(&self) -> Option<&'static str> {
        let len = self.query.chars().count();
        (self.mode == SearchMode::Keyword && len > 0 && len < MIN_KEYWORD_QUERY_CHARS)
            .then_some(KEYWORD_HINT_MESSAGE)
    }

    /// Clear query and cache; the mode is kept
    pub fn reset(&mut self) {
        self.query.clear();
        self.cache.reset();
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
        self.cache.apply_fetch(ticket, result, session)
    }

    pub async fn refresh(&mut self, client: &KnowledgeClient, session: &AuthSession) -> Applied {
        self.cache.refresh(client, session).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::test_support::{node, signed_in};

    #[test]
    fn test_keyword_minimum_length() {
        let nodes = vec![node("1", "Alpha"), node("2", "Beta")];

        assert!(keyword_search(&nodes, "al").is_empty());

        let results = keyword_search(&nodes, "alp");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title.as_deref(), Some("Alpha"));

        let upper = keyword_search(&nodes, "ALP");
        assert_eq!(upper.len(), 1);
    }

    #[test]
    fn test_keyword_counts_characters_not_bytes() {
        let nodes = vec![node("1", "Zoë's notes")];
        // two characters, three bytes
        assert!(keyword_search(&nodes, "oë").is_empty());
        assert_eq!(keyword_search(&nodes, "zoë").len(), 1);
    }

    #[test]
    fn test_view_modes_and_hint() {
        let session = signed_in("tok");
        let mut view = SearchView::new();
        let ticket = view.mount(&session).unwrap();
        view.apply_nodes(&ticket, Ok(vec![node("1", "Alpha"), node("2", "Beta")]), &session);

        view.set_query("alp");
        assert_eq!(view.mode(), SearchMode::Semantic);
        assert!(view.results().is_empty());
        assert!(!view.shows_results());

        view.toggle_mode();
        assert_eq!(view.results().len(), 1);
        assert!(view.shows_results());
        assert_eq!(view.hint(), None);

        view.pop_char();
        assert!(view.results().is_empty());
        assert_eq!(view.hint(), Some(KEYWORD_HINT_MESSAGE));

        view.set_query("");
        assert_eq!(view.hint(), None);
    }

    #[test]
    fn test_keyword_without_matches_is_empty_not_error() {
        let session = signed_in("tok");
        let mut view = SearchView::with_mode(SearchMode::Keyword);
        let ticket = view.mount(&session).unwrap();
        view.apply_nodes(&ticket, Ok(vec![node("1", "Alpha")]), &session);

        view.set_query("gamma");
        assert!(view.shows_results());
        assert!(view.results().is_empty());
        assert_eq!(view.take_alert(), None);
    }

    #[tokio::test]
    async fn test_mount_without_session() {
        let session = signed_in("tok");
        session.logout().await;

        let mut view = SearchView::new();
        assert_eq!(view.mount(&session), Err(KnowledgeError::SessionInvalid));
        assert_eq!(view.take_alert(), Some(Alert::SessionExpired));
    }

    #[test]
    fn test_mode_parse_and_labels() {
        assert_eq!("keyword".parse::<SearchMode>(), Ok(SearchMode::Keyword));
        assert_eq!("Neural".parse::<SearchMode>(), Ok(SearchMode::Semantic));
        assert!("fuzzy".parse::<SearchMode>().is_err());
        assert_eq!(SearchMode::Semantic.label(), "Neural Search");
        assert_eq!(SearchMode::ALL.len(), 2);
    }
}
