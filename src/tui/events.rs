//! Event handling for the Terminal UI

use crate::gate::Route;
use crate::tui::state::{Tab, TuiState};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Handle key events
pub fn handle_key_event(state: &mut TuiState, key: KeyEvent) {
    if key.kind == KeyEventKind::Release {
        return;
    }

    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        state.should_quit = true;
        return;
    }

    // Popups swallow keys until dismissed
    if state.alert.is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
            state.dismiss_alert();
        }
        return;
    }
    if state.show_help {
        state.show_help = false;
        return;
    }
    if state.nodes.pending_delete().is_some() {
        handle_delete_modal(state, key);
        return;
    }

    match state.route() {
        Route::Landing => handle_landing(state, key),
        Route::Privacy | Route::Terms => handle_document(state, key),
        Route::Home => handle_dashboard(state, key),
    }
}

fn handle_delete_modal(state: &mut TuiState, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Enter => state.confirm_delete(),
        KeyCode::Char('n') | KeyCode::Esc => state.nodes.cancel_delete(),
        _ => {}
    }
}

fn handle_landing(state: &mut TuiState, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => state.sign_in(),
        KeyCode::Char('p') => {
            state.navigator.navigate(Route::Privacy);
        }
        KeyCode::Char('t') => {
            state.navigator.navigate(Route::Terms);
        }
        KeyCode::Char('q') | KeyCode::Esc => state.should_quit = true,
        _ => {}
    }
}

fn handle_document(state: &mut TuiState, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => state.should_quit = true,
        KeyCode::Esc | KeyCode::Enter | KeyCode::Backspace => {
            // The gate sends a signed-in user on to the dashboard
            state.navigator.navigate(Route::Landing);
        }
        _ => {}
    }
}

fn handle_dashboard(state: &mut TuiState, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Esc => {
            state.should_quit = true;
            return;
        }
        KeyCode::Tab | KeyCode::BackTab => {
            state.tab = state.tab.next();
            return;
        }
        KeyCode::F(1) => {
            state.show_help = true;
            return;
        }
        KeyCode::Char('l') if ctrl => {
            state.logout();
            return;
        }
        _ => {}
    }

    match state.tab {
        Tab::Assistant => match key.code {
            KeyCode::Char('t') if ctrl => state.search.toggle_mode(),
            KeyCode::Char(c) if !ctrl => state.search.push_char(c),
            KeyCode::Backspace => state.search.pop_char(),
            _ => {}
        },
        Tab::Nodes => match key.code {
            KeyCode::Down | KeyCode::Char('j') => state.nodes.select_next(),
            KeyCode::Up | KeyCode::Char('k') => state.nodes.select_previous(),
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(id) = state.nodes.selected().map(|node| node.id.clone()) {
                    state.nodes.request_delete(&id);
                }
            }
            KeyCode::Char('r') => state.fetch(Tab::Nodes),
            KeyCode::Char('?') => state.show_help = true,
            KeyCode::Char('q') => state.should_quit = true,
            _ => {}
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{MemoryStorage, MockProvider};
    use crate::commands::Services;
    use crate::config::Config;
    use crate::knowledge::Node;
    use crate::views::Applied;
    use std::sync::Arc;

    fn press(state: &mut TuiState, code: KeyCode) {
        handle_key_event(state, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn dashboard() -> TuiState {
        let services = Services::new(
            Config::new(),
            Arc::new(MemoryStorage::new()),
            Arc::new(MockProvider::new("Ada", "tok")),
        )
        .unwrap();
        services.session.login("Ada", "tok");
        TuiState::new(&services)
    }

    fn load_nodes(state: &mut TuiState, nodes: Vec<Node>) {
        let ticket = state.nodes.mount(&state.session).unwrap();
        let applied = state.nodes.apply_nodes(&ticket, Ok(nodes), &state.session);
        assert_eq!(applied, Applied::Updated);
    }

    fn node(id: &str, title: &str) -> Node {
        Node {
            id: id.to_string(),
            title: Some(title.to_string()),
            description: None,
            content: None,
            url: None,
        }
    }

    #[tokio::test]
    async fn test_typing_edits_query_and_ctrl_t_toggles() {
        let mut state = dashboard();
        press(&mut state, KeyCode::Char('a'));
        press(&mut state, KeyCode::Char('l'));
        assert_eq!(state.search.query(), "al");

        press(&mut state, KeyCode::Backspace);
        assert_eq!(state.search.query(), "a");

        let before = state.search.mode();
        handle_key_event(
            &mut state,
            KeyEvent::new(KeyCode::Char('t'), KeyModifiers::CONTROL),
        );
        assert_eq!(state.search.mode(), before.toggled());
    }

    #[tokio::test]
    async fn test_delete_key_opens_modal_and_n_cancels() {
        let mut state = dashboard();
        load_nodes(&mut state, vec![node("1", "Alpha"), node("2", "Beta")]);

        press(&mut state, KeyCode::Tab);
        assert_eq!(state.tab, Tab::Nodes);
        press(&mut state, KeyCode::Down);
        press(&mut state, KeyCode::Char('d'));
        assert_eq!(state.nodes.pending_delete().map(|n| n.id.as_str()), Some("2"));

        // Navigation is blocked while the modal is open
        press(&mut state, KeyCode::Up);
        assert_eq!(state.nodes.selected_index(), 1);

        press(&mut state, KeyCode::Char('n'));
        assert!(state.nodes.pending_delete().is_none());
        assert_eq!(state.nodes.nodes().len(), 2);
    }

    #[tokio::test]
    async fn test_alert_swallows_keys_until_dismissed() {
        let mut state = dashboard();
        state.alert = Some(crate::views::Alert::RequestFailed);

        press(&mut state, KeyCode::Char('x'));
        assert_eq!(state.search.query(), "");
        assert!(state.alert.is_some());

        press(&mut state, KeyCode::Enter);
        assert!(state.alert.is_none());
        assert!(!state.should_quit);
    }

    #[tokio::test]
    async fn test_ctrl_c_quits_from_anywhere() {
        let mut state = dashboard();
        state.show_help = true;
        handle_key_event(
            &mut state,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        );
        assert!(state.should_quit);
    }
}
